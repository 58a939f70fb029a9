use std::sync::Arc;

use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{LoungeError, Result, GENERIC_ERROR_MESSAGE};
use crate::model::{Envelope, ErrorBody};
use crate::session::{Session, SessionTicket};

/// Thin wrapper over [`reqwest::Client`] that speaks the backend's envelope
/// protocol and owns the 401/404 policy.
///
/// There is no retry and no backoff. Every failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl Gateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.data(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.data(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.data(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.data(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.data(Method::DELETE, path, None::<&()>).await
    }

    /// Send a request whose envelope carries no meaningful `data`.
    /// Returns the server's confirmation message, if any.
    pub async fn command<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<String>> {
        let url = self.url(path);
        let bytes = self.send(method, &url, body).await?;
        let envelope: Envelope<serde_json::Value> = decode_envelope(&url, &bytes)?;
        Ok(envelope.message)
    }

    /// Fetch a raw body, requiring the response to carry `content_type`.
    pub async fn get_blob(&self, path: &str, content_type: &'static str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let ticket = self.session.ticket();
        let response = self.request(Method::GET, &url, &ticket, None::<&()>).await?;

        let actual = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !actual.starts_with(content_type) {
            return Err(LoungeError::UnexpectedContentType {
                url,
                expected: content_type,
                actual,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoungeError::Http {
                url: url.clone(),
                source: e,
            })?;
        debug!(url, len = bytes.len(), "downloaded blob");
        Ok(bytes.to_vec())
    }

    async fn data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path);
        let bytes = self.send(method, &url, body).await?;
        let envelope = decode_envelope(&url, &bytes)?;
        envelope.data.ok_or(LoungeError::MalformedEnvelope {
            url,
            reason: "success without data",
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>> {
        let ticket = self.session.ticket();
        let response = self.request(method, url, &ticket, body).await?;
        let bytes = response.bytes().await.map_err(|e| LoungeError::Http {
            url: url.to_owned(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        ticket: &SessionTicket,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        debug!(%method, url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(token) = &ticket.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| LoungeError::Http {
            url: url.to_owned(),
            source: e,
        })?;
        self.check_status(url, ticket, response).await
    }

    async fn check_status(
        &self,
        url: &str,
        ticket: &SessionTicket,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                if self.session.expire(ticket) {
                    warn!(url, "session rejected, redirected to login");
                }
                Err(LoungeError::Unauthorized {
                    url: url.to_owned(),
                })
            }
            StatusCode::NOT_FOUND => {
                warn!(url, "resource not found");
                Err(LoungeError::NotFound {
                    url: url.to_owned(),
                })
            }
            _ => {
                let body = response.bytes().await.unwrap_or_default();
                let message = serde_json::from_slice::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or(GENERIC_ERROR_MESSAGE)
                            .to_string()
                    });
                Err(LoungeError::Api {
                    url: url.to_owned(),
                    status,
                    message,
                })
            }
        }
    }
}

fn decode_envelope<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<Envelope<T>> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|source| LoungeError::Decode {
            url: url.to_owned(),
            source,
        })?;
    if !envelope.success {
        let message = envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        return Err(LoungeError::Rejected(message));
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::session::tests::CountingRedirect;
    use crate::test_support::MockBackend;

    fn gateway(mock: &MockBackend, redirect: Arc<CountingRedirect>) -> Gateway {
        let session = Arc::new(Session::with_token("secret", redirect));
        Gateway::new(reqwest::Client::new(), mock.url(), session)
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let mock = MockBackend::start().await;
        mock.ok("GET", "/games", json!([]));
        let gateway = gateway(&mock, Arc::default());

        let games: Vec<serde_json::Value> = gateway.get("/games").await.unwrap();
        assert!(games.is_empty());
        let requests = mock.requests();
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_concurrent_401s_redirect_once() {
        let mock = MockBackend::start().await;
        mock.stub_json("GET", "/events", 401, json!({ "message": "expired" }));
        mock.stub_json("GET", "/teams", 401, json!({ "message": "expired" }));
        let redirect = Arc::new(CountingRedirect::default());
        let gateway = gateway(&mock, redirect.clone());

        let (a, b, c) = tokio::join!(
            gateway.get::<serde_json::Value>("/events"),
            gateway.get::<serde_json::Value>("/teams"),
            gateway.get::<serde_json::Value>("/events"),
        );
        assert!(a.unwrap_err().is_unauthorized());
        assert!(b.unwrap_err().is_unauthorized());
        assert!(c.unwrap_err().is_unauthorized());
        assert_eq!(redirect.0.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.session().token(), None);
    }

    #[tokio::test]
    async fn test_404_is_reported_without_touching_session() {
        let mock = MockBackend::start().await;
        let redirect = Arc::new(CountingRedirect::default());
        let gateway = gateway(&mock, redirect.clone());

        let err = gateway.get::<serde_json::Value>("/events/nope").await.unwrap_err();
        assert!(matches!(err, LoungeError::NotFound { .. }));
        assert_eq!(gateway.session().token().as_deref(), Some("secret"));
        assert_eq!(redirect.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let mock = MockBackend::start().await;
        mock.stub_json("POST", "/events", 422, json!({ "message": "Name taken" }));
        let gateway = gateway(&mock, Arc::default());

        let err = gateway
            .post::<serde_json::Value, _>("/events", &json!({ "name": "x" }))
            .await
            .unwrap_err();
        match err {
            LoungeError::Api { status, message, .. } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(message, "Name taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_envelope_validation() {
        let mock = MockBackend::start().await;
        mock.stub_json("GET", "/offer", 200, json!({ "success": false }));
        mock.stub_json("GET", "/games", 200, json!({ "success": true }));
        mock.stub_json("GET", "/packages", 200, json!({ "data": [] }));
        let gateway = gateway(&mock, Arc::default());

        let rejected = gateway.get::<Vec<serde_json::Value>>("/offer").await.unwrap_err();
        assert!(matches!(rejected, LoungeError::Rejected(ref m) if m == GENERIC_ERROR_MESSAGE));

        let missing = gateway.get::<Vec<serde_json::Value>>("/games").await.unwrap_err();
        assert!(matches!(missing, LoungeError::MalformedEnvelope { .. }));

        let undecodable = gateway.get::<Vec<serde_json::Value>>("/packages").await.unwrap_err();
        assert!(matches!(undecodable, LoungeError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_command_accepts_envelope_without_data() {
        let mock = MockBackend::start().await;
        mock.stub_json(
            "POST",
            "/events/e1/start",
            200,
            json!({ "success": true, "message": "Event started" }),
        );
        let gateway = gateway(&mock, Arc::default());

        let message = gateway
            .command(Method::POST, "/events/e1/start", None::<&()>)
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Event started"));
    }

    #[tokio::test]
    async fn test_blob_checks_content_type() {
        let mock = MockBackend::start().await;
        mock.stub_raw("GET", "/a.csv", 200, "text/csv; charset=utf-8", b"a,b\n1,2\n");
        mock.stub_raw("GET", "/b.csv", 200, "text/html", b"<html/>");
        let gateway = gateway(&mock, Arc::default());

        let bytes = gateway.get_blob("/a.csv", "text/csv").await.unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");
        let err = gateway.get_blob("/b.csv", "text/csv").await.unwrap_err();
        assert!(matches!(err, LoungeError::UnexpectedContentType { .. }));
    }
}
