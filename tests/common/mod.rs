//! In-process stand-in for the plate server.
//!
//! Every request is recorded; responses come from a table of canned
//! `(method, path) -> (status, body)` entries, 404 otherwise. A route can
//! also be told to stall and never answer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tokio::net::TcpListener;

use plate_console::api::Api;
use plate_console::http::HttpClient;
use plate_console::navigation::{History, Navigator};
use plate_console::session::{AuthService, SessionStore};
use plate_console::storage::{KeyValueStore, MemoryStore};

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

#[derive(Debug, Clone)]
enum Canned {
    Reply(StatusCode, String),
    Stall,
}

#[derive(Debug, Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<Recorded>>,
}

#[derive(Debug, Clone)]
pub struct MockServer {
    pub origin: String,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            origin: format!("http://{addr}"),
            state,
        }
    }

    /// Answer `method path` with a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    /// Answer `method path` with a verbatim body.
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state.routes.lock().unwrap().insert(
            (method, path.to_string()),
            Canned::Reply(StatusCode::from_u16(status).unwrap(), body.to_string()),
        );
    }

    /// Accept `method path` but never answer it.
    pub fn stall(&self, method: Method, path: &str) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Canned::Stall);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let path = parts.uri.path().to_string();

    state.requests.lock().unwrap().push(Recorded {
        method: parts.method.clone(),
        path: path.clone(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&(parts.method, path))
        .cloned();
    let (status, body) = match canned {
        Some(Canned::Reply(status, body)) => (status, body),
        Some(Canned::Stall) => std::future::pending().await,
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#.to_string()),
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Client wired to a mock server with in-memory storage.
#[derive(Debug)]
pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStore>,
    pub history: Arc<History>,
    pub client: HttpClient,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStore::new());
        let history = Arc::new(History::new());

        let kv: Arc<dyn KeyValueStore> = Arc::<MemoryStore>::clone(&storage);
        let navigator: Arc<dyn Navigator> = Arc::<History>::clone(&history);
        let client = HttpClient::new(&server.origin, SessionStore::new(kv), navigator).unwrap();

        Self {
            server,
            storage,
            history,
            client,
        }
    }

    pub fn api(&self) -> Api {
        Api::new(self.client.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Canned `/auth/login` and `/auth/me` for a successful sign-in.
    pub fn accept_login(&self, token: &str, profile: &Value) {
        self.server.respond(
            Method::POST,
            "/plate/api/auth/login",
            200,
            &serde_json::json!({ "access_token": token, "token_type": "bearer" }),
        );
        self.server
            .respond(Method::GET, "/plate/api/auth/me", 200, profile);
    }
}
