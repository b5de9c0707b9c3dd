//! Request gateway - the shared pipeline between tools and the ArcGIS REST
//! services.
//!
//! Every tool submits a [`CallDescriptor`] and gets back exactly one outcome:
//! the parsed JSON success body, or a [`GatewayError`]. The gateway owns the
//! three steps that are identical for every endpoint:
//!
//! 1. Parameter completion - credential injection (per-call override, then
//!    the process-wide default) and the `f=json` response-format default.
//! 2. Transport execution - one scoped HTTP exchange per call, with the
//!    fixed `User-Agent`, the caller's timeout, and redacted request logging.
//! 3. Error normalization - the ArcGIS services report in-band errors inside
//!    HTTP-successful responses, so a 2xx status alone never implies logical
//!    success; the body is always inspected for a top-level `error` object.
//!
//! The gateway performs no retries and no caching. Callers decide whether to
//! surface a normalized error verbatim or reformat it.

mod descriptor;
mod error;
mod trace;

pub use descriptor::{CallDescriptor, DEFAULT_TIMEOUT, Method};
pub use error::{GatewayError, GatewayResult};
pub use trace::REDACTION_MARKER;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::{Map, Value};

use trace::{log_request, query_pairs};

/// User-Agent header sent with every upstream request.
pub const AGENT: &str = "arcgis-location-services-mcp/1.0";

/// The request gateway.
///
/// Holds the shared HTTP client and the read-only default credential. Both
/// are fixed at construction; the gateway has no other state, so a single
/// instance can serve any number of concurrent calls.
pub struct Gateway {
    client: reqwest::Client,
    default_token: Option<String>,
}

impl Gateway {
    /// Create a gateway with an optional process-wide default token.
    ///
    /// A missing token is not an error; calls simply proceed
    /// unauthenticated unless a per-call override supplies one.
    pub fn new(default_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_token,
        }
    }

    /// Execute one upstream call, yielding exactly one normalized outcome.
    pub async fn execute(
        &self,
        descriptor: CallDescriptor,
    ) -> GatewayResult<Map<String, Value>> {
        let CallDescriptor {
            url,
            mut params,
            method,
            timeout,
            token,
        } = descriptor;

        // Credential resolution: per-call override wins, then the process
        // default, then unauthenticated.
        if let Some(token) = token {
            params.insert("token".to_string(), Value::String(token));
        } else if let Some(default) = &self.default_token
            && !params.contains_key("token")
        {
            params.insert("token".to_string(), Value::String(default.clone()));
        }

        if !params.contains_key("f") {
            params.insert("f".to_string(), Value::String("json".to_string()));
        }

        // POST sends only `f` and `token` in the query string; everything
        // else travels in the JSON body. GET sends everything as query.
        let (query, body) = match method {
            Method::Get => (params, None),
            Method::Post => {
                let mut query = Map::new();
                if let Some(f) = params.remove("f") {
                    query.insert("f".to_string(), f);
                }
                if let Some(token) = params.remove("token") {
                    query.insert("token".to_string(), token);
                }
                (query, Some(params))
            }
        };

        let mut headers = vec![("User-Agent", AGENT), ("Accept", "application/json")];
        if body.is_some() {
            headers.push(("Content-Type", "application/json"));
        }
        log_request(&url, &query, method, &headers, body.as_ref());

        let builder = match &body {
            None => self.client.get(&url),
            Some(body) => self.client.post(&url).json(body),
        };
        let response = builder
            .query(&query_pairs(&query, false))
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        Self::classify(response).await
    }

    /// Check whether a resource exists upstream via a HEAD exchange.
    ///
    /// Used by the basemap tile tool, whose payload is an image rather than
    /// JSON. The default token is forwarded when configured; there is no
    /// body to classify, so the raw status is returned.
    pub async fn probe(&self, url: &str, timeout: Duration) -> GatewayResult<StatusCode> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = &self.default_token {
            query.push(("token", token));
        }

        self.client
            .head(url)
            .query(&query)
            .header(USER_AGENT, AGENT)
            .timeout(timeout)
            .send()
            .await
            .map(|response| response.status())
            .map_err(|e| transport_error(e, timeout))
    }

    /// Classify the upstream response into the normalized outcome.
    ///
    /// Precedence: HTTP-status failure, then undecodable body, then in-band
    /// `error` object, then success.
    async fn classify(response: reqwest::Response) -> GatewayResult<Map<String, Value>> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<Value>(&text) {
                Ok(detail) => embedded_error(&detail)
                    .unwrap_or_else(|| (status.as_u16() as i64, generic_status_message(status))),
                Err(_) => (status.as_u16() as i64, generic_status_message(status)),
            };
            return Err(GatewayError::Status { code, message });
        }

        let parsed: Value =
            serde_json::from_str(&text).map_err(|_| GatewayError::MalformedResponse)?;
        let Value::Object(map) = parsed else {
            return Err(GatewayError::MalformedResponse);
        };

        if map.contains_key("error") {
            let (code, message) = embedded_error(&Value::Object(map))
                .unwrap_or_else(|| (0, "Unknown error".to_string()));
            return Err(GatewayError::Api { code, message });
        }

        Ok(map)
    }
}

/// Map a reqwest failure to a transport-level normalized error.
fn transport_error(err: reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Transport(format!("request timed out after {:?}", timeout))
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// Extract `error.message` / `error.code` from an upstream payload.
fn embedded_error(value: &Value) -> Option<(i64, String)> {
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();
    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    Some((code, message))
}

fn generic_status_message(status: StatusCode) -> String {
    format!("upstream returned {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_with(token: Option<&str>) -> Gateway {
        Gateway::new(token.map(str::to_string))
    }

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/near-point"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"name": "Blue Bottle Coffee"}]
            })))
            .mount(&server)
            .await;

        let result = gateway_with(None)
            .execute(CallDescriptor::get(format!("{}/places/near-point", server.uri())))
            .await
            .unwrap();

        assert_eq!(result["results"][0]["name"], "Blue Bottle Coffee");
    }

    #[tokio::test]
    async fn test_in_band_error_beats_http_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "Invalid token", "code": 498}
            })))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();

        match err {
            GatewayError::Api { code, ref message } => {
                assert_eq!(code, 498);
                assert!(message.contains("Invalid token"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_band_error_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": {}})))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();

        match err {
            GatewayError::Api { code, ref message } => {
                assert_eq!(code, 0);
                assert_eq!(message, "Unknown error");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_with_unparseable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<html>not here</html>"))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();

        match err {
            GatewayError::Status { code, .. } => assert_eq!(code, 404),
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_with_embedded_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Missing stops parameter", "code": 400}
            })))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();

        match err {
            GatewayError::Status { code, ref message } => {
                assert_eq!(code, 400);
                assert!(message.contains("Missing stops parameter"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_status_with_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_success_status_with_non_object_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let err = gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 1 is never listening locally.
        let err = gateway_with(None)
            .execute(
                CallDescriptor::get("http://127.0.0.1:1/nothing")
                    .timeout(Duration::from_secs(2)),
            )
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.code(), None);
    }

    #[tokio::test]
    async fn test_default_token_and_format_injected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("token", "default-key"))
            .and(query_param("f", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        gateway_with(Some("default-key"))
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_override_token_wins_over_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("token", "override-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        gateway_with(Some("default-key"))
            .execute(CallDescriptor::get(server.uri()).token("override-key"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_explicit_format_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("f", "pjson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        gateway_with(None)
            .execute(CallDescriptor::get(server.uri()).param("f", "pjson"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unauthenticated_call_is_still_attempted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param_is_missing("token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        gateway_with(None)
            .execute(CallDescriptor::get(server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_post_splits_query_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enrich"))
            .and(query_param("f", "json"))
            .and(query_param("token", "default-key"))
            .and(body_partial_json(json!({"studyAreas": "[]"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        gateway_with(Some("default-key"))
            .execute(
                CallDescriptor::post(format!("{}/enrich", server.uri()))
                    .param("studyAreas", "[]"),
            )
            .await
            .unwrap();

        // The body must carry only the non-reserved parameters.
        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("f").is_none());
        assert!(body.get("token").is_none());
        assert_eq!(body["studyAreas"], "[]");
    }

    #[tokio::test]
    async fn test_get_sends_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        gateway_with(None)
            .execute(CallDescriptor::get(server.uri()).param("x", 1))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_identical_descriptors_yield_identical_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 7})))
            .expect(2)
            .mount(&server)
            .await;

        let gateway = gateway_with(Some("k"));
        let descriptor = CallDescriptor::get(server.uri()).param("x", 1);
        let first = gateway.execute(descriptor.clone()).await.unwrap();
        let second = gateway.execute(descriptor).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_probe_forwards_token_and_returns_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(query_param("token", "default-key"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let status = gateway_with(Some("default-key"))
            .probe(&server.uri(), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }
}
