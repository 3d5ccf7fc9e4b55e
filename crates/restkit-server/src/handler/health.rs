//! Liveness endpoint.

use jiff::Timestamp;
use serde::Serialize;

use super::response::Envelope;
use crate::routing::{Handler, Route};

/// Body of a health check.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    /// Server time, RFC 3339.
    pub date: Timestamp,
}

async fn healthz() -> Envelope<Health> {
    Envelope::success(Health {
        date: Timestamp::now(),
    })
}

/// Returns the health check routes.
pub fn routes() -> Vec<Route> {
    vec![Route::get("/healthz", Handler::from_axum(healthz, ()))]
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn healthz_reports_date() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/healthz").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "OK");
        assert_eq!(body["statusCode"], 200);

        let date = body["data"]["date"].as_str().unwrap_or_default();
        assert!(date.parse::<jiff::Timestamp>().is_ok(), "{date}");
        Ok(())
    }
}
