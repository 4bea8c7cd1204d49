//! HTTP façade for the marketplace REST API.
//!
//! Every feature client goes through [`ApiClient`] so request setup, timeouts,
//! bearer attachment and error mapping stay in one place. A 401/403 from any
//! endpoint clears the locally stored session before the error is returned, so
//! callers never keep sending a token the server already rejected.

pub mod config;
pub mod errors;

pub use config::ClientConfig;
pub use errors::ApiError;

use crate::features::auth::{store::SessionStore, token};
use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info_span, warn, Instrument};

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: Client,
    base_url: String,
    session: SessionStore,
    rejections: watch::Sender<u64>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client bound to `session` for bearer tokens and cleanup.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|err| ApiError::Config(format!("Invalid API base URL {base_url:?}: {err}")))?;

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        let (rejections, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                session,
                rejections,
            }),
        })
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Counts credential rejections (401/403). The value changes every time the
    /// API rejects the bearer token and the stored session is cleared.
    #[must_use]
    pub fn rejections(&self) -> watch::Receiver<u64> {
        self.inner.rejections.subscribe()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Fetches JSON from `path`.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport, status, or decode failure.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        self.handle_json_response(response).await
    }

    /// Posts JSON and expects an empty (or ignored) response body.
    ///
    /// # Errors
    /// Returns an `ApiError` on encode, transport, or status failure.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let payload = encode(body)?;
        let response = self
            .send(self.json_request(Method::POST, path, payload))
            .await?;
        self.handle_empty_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `ApiError` on encode, transport, status, or decode failure.
    pub async fn post_json_response<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = encode(body)?;
        let response = self
            .send(self.json_request(Method::POST, path, payload))
            .await?;
        self.handle_json_response(response).await
    }

    /// Posts an empty body, used for action endpoints such as sign-out.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport or status failure.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        self.handle_empty_response(response).await
    }

    /// Puts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `ApiError` on encode, transport, status, or decode failure.
    pub async fn put_json_response<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = encode(body)?;
        let response = self
            .send(self.json_request(Method::PUT, path, payload))
            .await?;
        self.handle_json_response(response).await
    }

    /// Sends a DELETE and expects an empty response body.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport or status failure.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        self.handle_empty_response(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = build_url_with_base(&self.inner.base_url, path);
        let builder = self.inner.client.request(method, url);

        match self.inner.session.token() {
            Some(token) if !token::is_expired(token.expose_secret()) => {
                builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            }
            _ => builder,
        }
    }

    fn json_request(&self, method: Method, path: &str, payload: String) -> RequestBuilder {
        self.request(method, path)
            .header("Content-Type", "application/json")
            .body(payload)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder
            .build()
            .map_err(|err| ApiError::Serialization(format!("Failed to build request: {err}")))?;

        let span = info_span!(
            "api.request",
            http.method = %request.method(),
            url = %request.url().path()
        );

        self.inner
            .client
            .execute(request)
            .instrument(span)
            .await
            .map_err(map_request_error)
    }

    async fn handle_json_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        let response = self.check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    }

    async fn handle_empty_response(&self, response: Response) -> Result<(), ApiError> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = sanitize_body(&body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "API rejected credentials; clearing session");
            if let Err(err) = self.inner.session.clear_tokens() {
                warn!("Failed to clear session after auth failure: {err}");
            }
            self.inner.rejections.send_modify(|count| *count += 1);
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "API request failed");

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body)
        .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))
}

/// Joins an explicit base URL and a path with exactly one slash between them.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Prefers a JSON `message`/`error` field, otherwise trims and truncates the raw body.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Request failed.".to_string();
    }

    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|json| {
        json.get("message")
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_json
        .as_deref()
        .unwrap_or(trimmed)
        .chars()
        .take(MAX_ERROR_CHARS)
        .collect()
}

/// Rejects blank path identifiers before a request is issued.
///
/// # Errors
/// Returns `ApiError::Config` naming `what` when `id` is blank.
pub fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(ApiError::Config(format!("{what} id is required.")))
    } else {
        Ok(trimmed)
    }
}

/// Validates `id` and percent-encodes it as a single URL path segment, so a
/// value like `../admin` cannot address a different endpoint.
///
/// # Errors
/// Returns `ApiError::Config` when `id` is blank or a dot segment.
pub fn path_id(id: &str, what: &str) -> Result<String, ApiError> {
    let id = require_id(id, what)?;
    if id == "." || id == ".." {
        return Err(ApiError::Config(format!("{what} id {id:?} is not valid.")));
    }

    let mut url = url::Url::parse("http://localhost/")
        .map_err(|err| ApiError::Config(format!("Failed to encode {what} id: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::Config(format!("Failed to encode {what} id.")))?
        .pop_if_empty()
        .push(id);

    Ok(url.path().trim_start_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let config = ClientConfig::default().with_api_base_url(server.uri());
        ApiClient::new(&config, session).unwrap()
    }

    fn token_with_exp(exp: i64) -> String {
        use base64ct::{Base64UrlUnpadded, Encoding};
        let payload = Base64UrlUnpadded::encode_string(json!({ "exp": exp }).to_string().as_bytes());
        format!("header.{payload}.sig")
    }

    #[test]
    fn build_url_with_base_joins_cleanly() {
        assert_eq!(
            build_url_with_base("https://api.test/", "/api/courses"),
            "https://api.test/api/courses"
        );
        assert_eq!(
            build_url_with_base("https://api.test", "api/courses"),
            "https://api.test/api/courses"
        );
        assert_eq!(build_url_with_base("  ", "/api/courses"), "/api/courses");
    }

    #[test]
    fn sanitize_body_prefers_message_and_truncates() {
        assert_eq!(sanitize_body(""), "Request failed.");
        assert_eq!(sanitize_body(r#"{"message":"Course not found"}"#), "Course not found");
        assert_eq!(sanitize_body(r#"{"error":"Bad request"}"#), "Bad request");
        assert_eq!(sanitize_body("  plain text  "), "plain text");
        let long = "x".repeat(500);
        assert_eq!(sanitize_body(&long).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn require_id_rejects_blank() {
        assert_eq!(require_id(" 42 ", "Course").unwrap(), "42");
        assert_eq!(
            require_id("   ", "Course"),
            Err(ApiError::Config("Course id is required.".to_string()))
        );
    }

    #[test]
    fn path_id_encodes_single_segment() {
        assert_eq!(path_id(" 42 ", "Course").unwrap(), "42");
        assert_eq!(path_id("../admin/users", "Course").unwrap(), "..%2Fadmin%2Fusers");
        assert_eq!(path_id("a b?c#d", "Course").unwrap(), "a%20b%3Fc%23d");
        assert!(matches!(path_id("..", "Course"), Err(ApiError::Config(_))));
        assert_eq!(
            path_id(" ", "Course"),
            Err(ApiError::Config("Course id is required.".to_string()))
        );
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let config = ClientConfig::default().with_api_base_url("not a url");
        assert!(matches!(
            ApiClient::new(&config, session),
            Err(ApiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn attaches_bearer_only_for_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let valid = token_with_exp(chrono::Utc::now().timestamp() + 3600);
        client.session().set_tokens(&valid, None).unwrap();
        let _: Value = client.get_json("/api/ping").await.unwrap();

        let expired = token_with_exp(0);
        client.session().set_tokens(&expired, None).unwrap();
        let _: Value = client.get_json("/api/ping").await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].headers.get("authorization").unwrap(),
            &format!("Bearer {valid}")
        );
        assert!(requests[1].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn unauthorized_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Token revoked"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = token_with_exp(chrono::Utc::now().timestamp() + 3600);
        client.session().set_tokens(&token, Some("refresh")).unwrap();

        let result: Result<Value, ApiError> = client.get_json("/api/users/me").await;
        assert_eq!(
            result,
            Err(ApiError::Unauthorized {
                status: 401,
                message: "Token revoked".to_string()
            })
        );
        assert!(client.session().token().is_none());
        assert!(client.session().refresh_token().is_none());
    }

    #[tokio::test]
    async fn server_error_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comments"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = token_with_exp(chrono::Utc::now().timestamp() + 3600);
        client.session().set_tokens(&token, None).unwrap();

        let result = client.post_json("/api/comments", &json!({ "content": "hi" })).await;
        assert_eq!(
            result,
            Err(ApiError::Http {
                status: 500,
                message: "internal".to_string()
            })
        );
        assert!(client.session().token().is_some());
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Value, ApiError> = client.get_json("/api/courses").await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let config = ClientConfig::default().with_api_base_url("http://127.0.0.1:9");
        let client = ApiClient::new(&config, session).unwrap();

        let result = client.post_empty("/api/auth/logout").await;
        assert!(matches!(
            result,
            Err(ApiError::Network(_) | ApiError::Timeout(_))
        ));
    }
}
