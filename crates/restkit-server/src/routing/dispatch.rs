//! Immutable dispatch table built once per router.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use axum::http::Method;

use super::handler::Handler;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MethodHandlers {
    methods: HashMap<Method, Handler>,
    any: Option<Handler>,
}

#[derive(Debug)]
struct PrefixEntry {
    prefix: String,
    method: Option<Method>,
    handler: Handler,
}

/// Maps `(method, path)` to a handler.
///
/// Exact entries come from terminal routes and prefix entries from nested
/// routers. Prefix entries are kept sorted longest first.
#[derive(Debug, Default)]
pub(crate) struct DispatchTable {
    exact: HashMap<String, MethodHandlers>,
    prefixes: Vec<PrefixEntry>,
}

impl DispatchTable {
    /// Registers a handler for an exact path.
    pub fn insert_exact(
        &mut self,
        method: Option<Method>,
        path: String,
        handler: Handler,
    ) -> Result<()> {
        let handlers = self.exact.entry(path.clone()).or_default();
        match method {
            Some(method) => match handlers.methods.entry(method) {
                Entry::Occupied(entry) => Err(duplicate(Some(entry.key()), &path)),
                Entry::Vacant(entry) => {
                    entry.insert(handler);
                    Ok(())
                }
            },
            None if handlers.any.is_some() => Err(duplicate(None, &path)),
            None => {
                handlers.any = Some(handler);
                Ok(())
            }
        }
    }

    /// Registers a handler for every path starting with `prefix`.
    pub fn insert_prefix(
        &mut self,
        method: Option<Method>,
        prefix: String,
        handler: Handler,
    ) -> Result<()> {
        let taken = self
            .prefixes
            .iter()
            .any(|entry| entry.prefix == prefix && entry.method == method);
        if taken {
            return Err(duplicate(method.as_ref(), &prefix));
        }

        self.prefixes.push(PrefixEntry {
            prefix,
            method,
            handler,
        });
        self.prefixes
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(())
    }

    /// Resolves a request to its handler.
    ///
    /// Order: exact path with the request method, exact path with an
    /// any-method route, then the longest prefix accepting the method.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&Handler> {
        if let Some(handlers) = self.exact.get(path) {
            if let Some(handler) = handlers.methods.get(method) {
                return Some(handler);
            }
            if let Some(handler) = &handlers.any {
                return Some(handler);
            }
        }

        self.prefixes
            .iter()
            .filter(|entry| path.starts_with(&entry.prefix))
            .find(|entry| entry.method.as_ref().is_none_or(|m| m == method))
            .map(|entry| &entry.handler)
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        let exact: usize = self
            .exact
            .values()
            .map(|h| h.methods.len() + usize::from(h.any.is_some()))
            .sum();
        exact + self.prefixes.len()
    }
}

fn duplicate(method: Option<&Method>, path: &str) -> Error {
    let method = method.map_or("*", Method::as_str);
    Error::routing(format!("duplicate route {method} {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> Handler {
        Handler::new(|_request| async {})
    }

    #[test]
    fn reject_duplicate_exact_route() {
        let mut table = DispatchTable::default();
        table
            .insert_exact(Some(Method::GET), "/healthz".into(), handler())
            .unwrap();

        let error = table
            .insert_exact(Some(Method::GET), "/healthz".into(), handler())
            .unwrap_err();
        assert_eq!(error.message(), "duplicate route GET /healthz");

        table
            .insert_exact(Some(Method::POST), "/healthz".into(), handler())
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn reject_duplicate_any_route() {
        let mut table = DispatchTable::default();
        table.insert_exact(None, "/echo".into(), handler()).unwrap();

        let error = table.insert_exact(None, "/echo".into(), handler()).unwrap_err();
        assert_eq!(error.message(), "duplicate route * /echo");
    }

    #[test]
    fn reject_duplicate_prefix() {
        let mut table = DispatchTable::default();
        table.insert_prefix(None, "/auth/".into(), handler()).unwrap();
        assert!(table.insert_prefix(None, "/auth/".into(), handler()).is_err());
    }

    #[test]
    fn resolve_misses() {
        let mut table = DispatchTable::default();
        table
            .insert_exact(Some(Method::GET), "/healthz".into(), handler())
            .unwrap();
        table
            .insert_prefix(Some(Method::GET), "/users/".into(), handler())
            .unwrap();

        assert!(table.resolve(&Method::GET, "/healthz").is_some());
        assert!(table.resolve(&Method::POST, "/healthz").is_none());
        assert!(table.resolve(&Method::GET, "/healthz/").is_none());
        assert!(table.resolve(&Method::GET, "/users").is_none());
        assert!(table.resolve(&Method::GET, "/users/hello").is_some());
        assert!(table.resolve(&Method::DELETE, "/users/hello").is_none());
    }
}
