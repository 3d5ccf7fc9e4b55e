//! URL path joining for route registration.

/// Joins a router prefix and a route path into an absolute request path.
///
/// Repeated separators collapse into one, the result always starts with `/`
/// and a trailing `/` on `path` is preserved.
///
/// ```
/// use restkit_server::routing::join;
///
/// assert_eq!(join("/", "/healthz"), "/healthz");
/// assert_eq!(join("/users", "/"), "/users/");
/// assert_eq!(join("/api/", "//v1/items"), "/api/v1/items");
/// ```
pub fn join(prefix: &str, path: &str) -> String {
    let segments: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    joined.push('/');
    joined.push_str(&segments.join("/"));

    if path.ends_with('/') && !joined.ends_with('/') {
        joined.push('/');
    }

    joined
}

/// Returns `true` if `path` contains a `.` or `..` segment.
pub(crate) fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "." || segment == "..")
}

/// Returns `path` with exactly one trailing `/`.
pub(crate) fn with_trailing_slash(path: &str) -> String {
    let mut path = join(path, "");
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_root() {
        assert_eq!(join("/", "/"), "/");
        assert_eq!(join("", ""), "/");
        assert_eq!(join("/", "/healthz"), "/healthz");
    }

    #[test]
    fn join_keeps_trailing_slash_of_path() {
        assert_eq!(join("/users", "/"), "/users/");
        assert_eq!(join("/users/", "/hello"), "/users/hello");
        assert_eq!(join("/auth", "/login/"), "/auth/login/");
    }

    #[test]
    fn join_collapses_separators() {
        assert_eq!(join("//api//", "//v1///items"), "/api/v1/items");
        assert_eq!(join("api", "v1"), "/api/v1");
    }

    #[test]
    fn detect_dot_segments() {
        assert!(has_dot_segment("/api/../auth"));
        assert!(has_dot_segment("/./login"));
        assert!(has_dot_segment(".."));
        assert!(!has_dot_segment("/api/v1.2/items"));
        assert!(!has_dot_segment("/.well-known/jwks"));
    }

    #[test]
    fn trailing_slash_is_enforced_once() {
        assert_eq!(with_trailing_slash("/auth"), "/auth/");
        assert_eq!(with_trailing_slash("/auth/"), "/auth/");
        assert_eq!(with_trailing_slash("auth//"), "/auth/");
        assert_eq!(with_trailing_slash("/"), "/");
    }
}
