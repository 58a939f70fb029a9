//! In-process mock backend used by the unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;

use crate::client::LoungeClient;
use crate::config::ClientConfig;

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct Stub {
    status: u16,
    content_type: String,
    body: Vec<u8>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct MockState {
    stubs: Mutex<HashMap<(String, String), Vec<Stub>>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Stubs are keyed by method and path (query included). Stubs queued for
/// the same key are served in order; the last one repeats.
pub(crate) struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> LoungeClient {
        LoungeClient::from_config(ClientConfig::new(self.url()).with_token("test-token")).unwrap()
    }

    fn push(&self, method: &str, path: &str, stub: Stub) {
        self.state
            .stubs
            .lock()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push(stub);
    }

    pub fn stub_json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.stub_delayed(method, path, status, body, None);
    }

    pub fn stub_delayed(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: Value,
        delay: Option<Duration>,
    ) {
        self.push(
            method,
            path,
            Stub {
                status,
                content_type: "application/json".to_string(),
                body: body.to_string().into_bytes(),
                delay,
            },
        );
    }

    pub fn stub_raw(&self, method: &str, path: &str, status: u16, content_type: &str, body: &[u8]) {
        self.push(
            method,
            path,
            Stub {
                status,
                content_type: content_type.to_string(),
                body: body.to_vec(),
                delay: None,
            },
        );
    }

    /// Shorthand for a successful envelope carrying `data`.
    pub fn ok(&self, method: &str, path: &str, data: Value) {
        self.stub_json(
            method,
            path,
            200,
            serde_json::json!({ "success": true, "data": data }),
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    state.requests.lock().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        body: serde_json::from_slice(&body).ok(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let stub = {
        let mut stubs = state.stubs.lock();
        match stubs.get_mut(&(method.to_string(), path)) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        }
    };

    let Some(stub) = stub else {
        return (StatusCode::NOT_FOUND, r#"{"message":"no stub"}"#).into_response();
    };
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(stub.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, stub.content_type)], stub.body).into_response()
}

pub(crate) fn event_json(id: &str, category: &str, start: &str, emails: &[(&str, bool)]) -> Value {
    let registered: Vec<Value> = emails
        .iter()
        .map(|(email, verified)| serde_json::json!({ "email": email, "verified": verified }))
        .collect();
    serde_json::json!({
        "_id": id,
        "name": format!("Event {id}"),
        "category": category,
        "startDate": start,
        "endDate": start,
        "status": "not_started",
        "totalSpots": 16,
        "numberOfTeams": 4,
        "participationPerTeam": 3,
        "registeredEmails": registered,
    })
}

pub(crate) fn team_json(id: &str, members: &[(&str, bool)], events: &[&str]) -> Value {
    let members: Vec<Value> = members
        .iter()
        .map(|(email, verified)| serde_json::json!({ "email": email, "verified": verified }))
        .collect();
    let registrations: Vec<Value> = events
        .iter()
        .map(|event| serde_json::json!({ "eventId": event }))
        .collect();
    serde_json::json!({
        "_id": id,
        "name": format!("Team {id}"),
        "leaderEmail": format!("lead-{id}@x.com"),
        "memberEmails": members,
        "registeredEvents": registrations,
    })
}
