//! Authenticated HTTP client for the `/plate/api` endpoints.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::navigation::{LOGIN_PAGE, Navigator};
use crate::session::SessionStore;

/// Prefix of every REST endpoint.
pub const API_PREFIX: &str = "/plate/api";

/// Per-request options.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Headers merged over the auth headers; same-named headers win.
    pub headers: HeaderMap,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Raw request body.
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// Options carrying a JSON body.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            headers,
            query: Vec::new(),
            body: Some(serde_json::to_vec(body)?),
        })
    }

    /// Options carrying query pairs.
    #[must_use]
    pub fn query(pairs: &[(&str, &str)]) -> Self {
        Self {
            query: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

/// HTTP client bound to a server origin and a session.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use plate_console::http::HttpClient;
/// use plate_console::navigation::History;
/// use plate_console::session::SessionStore;
/// use plate_console::storage::MemoryStore;
///
/// # async fn example() -> plate_console::Result<()> {
/// let session = SessionStore::new(Arc::new(MemoryStore::new()));
/// let client = HttpClient::new("http://127.0.0.1:8000", session, Arc::new(History::new()))?;
///
/// let types: serde_json::Value = client.get("/violation-types", &[]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    origin: Url,
    http: reqwest::Client,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl HttpClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `origin` - Scheme and host of the server (e.g. "http://127.0.0.1:8000")
    pub fn new(
        origin: impl AsRef<str>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Self::with_client(origin, reqwest::Client::new(), session, navigator)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(
        origin: impl AsRef<str>,
        http: reqwest::Client,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let origin = Url::parse(origin.as_ref())?;
        Ok(Self {
            origin,
            http,
            session,
            navigator,
        })
    }

    /// Server origin.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Session this client authenticates with.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Navigator used for login redirects.
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub(crate) fn raw(&self) -> &reqwest::Client {
        &self.http
    }

    // ─────────────────────────────────────────────────────────────────────────
    // URLs and headers
    // ─────────────────────────────────────────────────────────────────────────

    /// Absolute URL for a server path such as `/plate/detect`.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.origin.join(path)?)
    }

    /// Absolute URL for an API path such as `/violations`.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        self.url(&format!("{API_PREFIX}{path}"))
    }

    /// Headers sent with every API request.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(name: "http.token.invalid", error = %e, "Stored token is not a valid header value"),
            }
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request to an API path.
    ///
    /// A 401 clears the session, navigates to the login page and resolves to
    /// [`Error::SessionExpired`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let mut url = self.api_url(path)?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let mut headers = self.auth_headers();
        headers.extend(options.headers);

        debug!(name: "http.request.sending", method = %method, url = %url, "Sending request");

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(name: "http.request.failed", method = %method, path = %path, error = %e, "API request failed");
            Error::Network(e)
        })?;

        self.handle_response(&method, path, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(name: "http.request.unauthorized", method = %method, path = %path, "Session rejected by server");
            if let Err(e) = self.session.clear() {
                warn!(name: "session.clear.failed", error = %e, "Failed to clear session");
            }
            self.navigator.navigate(LOGIN_PAGE);
            return Err(Error::SessionExpired);
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(status, &bytes);
            error!(
                name: "http.request.rejected",
                method = %method,
                path = %path,
                status = status.as_u16(),
                message = %message,
                "API request failed"
            );
            return Err(Error::Request {
                status: status.as_u16(),
                message,
            });
        }

        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        Ok(serde_json::from_slice(body)?)
    }

    /// GET with optional query pairs.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.request(Method::GET, path, RequestOptions::query(query))
            .await
    }

    /// POST a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, RequestOptions::json(body)?)
            .await
    }

    /// PUT a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, RequestOptions::json(body)?)
            .await
    }

    /// DELETE.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, RequestOptions::default())
            .await
    }
}

/// Human-readable message for an error response body.
///
/// Uses the `detail` string when the body is JSON carrying one.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(json) => json
            .get("detail")
            .and_then(Value::as_str)
            .map_or_else(
                || format!("HTTP error! status: {}", status.as_u16()),
                str::to_string,
            ),
        Err(_) => "An error occurred".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::History;
    use crate::session::{Profile, Role};
    use crate::storage::MemoryStore;

    fn client() -> HttpClient {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        HttpClient::new("http://127.0.0.1:8000", session, Arc::new(History::new())).unwrap()
    }

    #[test]
    fn api_urls_live_under_prefix() {
        let client = client();
        assert_eq!(
            client.api_url("/violations/ticket/T-1").unwrap().as_str(),
            "http://127.0.0.1:8000/plate/api/violations/ticket/T-1"
        );
        assert_eq!(
            client.url("/plate/detect").unwrap().as_str(),
            "http://127.0.0.1:8000/plate/detect"
        );
    }

    #[test]
    fn auth_header_follows_session() {
        let client = client();
        assert!(client.auth_headers().get(AUTHORIZATION).is_none());

        client
            .session()
            .set_session("abc", &Profile::with_role(Role::Officer))
            .unwrap();
        let headers = client.auth_headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn error_message_fallbacks() {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(error_message(status, br#"{"detail":"Bad plate"}"#), "Bad plate");
        assert_eq!(
            error_message(status, br#"{"detail":[{"loc":["body"]}]}"#),
            "HTTP error! status: 422"
        );
        assert_eq!(error_message(status, b"<html>oops</html>"), "An error occurred");
    }
}
