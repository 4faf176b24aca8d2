//! HTTP transport seam
//!
//! The pipeline only needs "send a request, get a status and a body back".
//! `HttpTransport` does that over reqwest; tests plug in a scripted
//! implementation of the same trait.

use crate::error::CreditsError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Header carrying the short-lived session token
pub const AUTH_HEADER: &str = "x-redlock-auth";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Longest body excerpt kept in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// Short-lived bearer token returned by `/login`
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the token itself.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken({})", crate::config::mask_secret(&self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request against the API, path relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub auth_token: Option<AuthToken>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            auth_token: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            auth_token: None,
            body: Some(body),
        }
    }

    /// Attach the session token header
    pub fn with_token(mut self, token: &AuthToken) -> Self {
        self.auth_token = Some(token.clone());
        self
    }
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body truncated for error messages
    pub fn body_excerpt(&self) -> String {
        if self.body.chars().count() <= BODY_EXCERPT_LEN {
            self.body.clone()
        } else {
            let head: String = self.body.chars().take(BODY_EXCERPT_LEN).collect();
            format!("{}…", head)
        }
    }

    /// Turn a non-2xx response into `UnexpectedStatus`
    pub fn error_for_status(self, endpoint: &str) -> Result<Self, CreditsError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CreditsError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: self.status,
                body: self.body_excerpt(),
            })
        }
    }
}

/// Request/response capability used by every pipeline stage
pub trait Transport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, CreditsError>> + Send;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CreditsError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CreditsError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CreditsError> {
        let url = self.url(&request.path);
        tracing::debug!(method = ?request.method, %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .header(reqwest::header::ACCEPT, JSON_CONTENT_TYPE);

        if let Some(token) = &request.auth_token {
            builder = builder.header(AUTH_HEADER, token.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| CreditsError::Transport {
                endpoint: request.path.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| CreditsError::Transport {
                endpoint: request.path.clone(),
                source,
            })?;

        tracing::debug!(%url, status, bytes = body.len(), "Received response");

        Ok(ApiResponse { status, body })
    }
}

/// Scripted transport for unit tests: replays canned responses in order and
/// records every request it receives.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, status: u16, body: impl Into<String>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(ApiResponse::new(status, body));
            self
        }

        pub(crate) fn respond_json(self, body: serde_json::Value) -> Self {
            self.respond(200, body.to_string())
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CreditsError> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.responses.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| {
                panic!("no scripted response left for {}", request.path)
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport =
            HttpTransport::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com");
        assert_eq!(transport.url("/login"), "https://api.example.com/login");
        assert_eq!(
            transport.url("license/api/v2/usage"),
            "https://api.example.com/license/api/v2/usage"
        );
    }

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse::new(200, "{}").error_for_status("/cloud");
        assert!(ok.is_ok());

        let err = ApiResponse::new(401, "denied")
            .error_for_status("/cloud")
            .unwrap_err();
        match err {
            CreditsError::UnexpectedStatus {
                endpoint,
                status,
                body,
            } => {
                assert_eq!(endpoint, "/cloud");
                assert_eq!(status, 401);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_body_excerpt_truncates() {
        let response = ApiResponse::new(500, "x".repeat(1000));
        let excerpt = response.body_excerpt();
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_LEN + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn test_token_debug_is_masked() {
        let token = AuthToken::new("eyJhbGciOiJIUzI1NiJ9.payload.signature");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("payload"));
        assert!(debug.starts_with("AuthToken("));
    }
}
