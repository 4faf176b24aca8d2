//! Login: exchange the access key pair for a short-lived session token

use crate::error::CreditsError;
use crate::transport::{ApiRequest, AuthToken, Transport};
use serde::Deserialize;
use serde_json::json;

pub const LOGIN_PATH: &str = "/login";

/// Access key pair sent to `/login`
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &crate::config::mask_secret(&self.secret_key))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Obtains session tokens from the login endpoint. No retries.
pub struct TokenProvider<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> TokenProvider<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// POST the credentials and extract `token` from the response
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken, CreditsError> {
        let body = json!({
            "username": credentials.access_key_id,
            "password": credentials.secret_key,
        });

        let response = self
            .transport
            .send(ApiRequest::post(LOGIN_PATH, body))
            .await?;

        if !response.is_success() {
            return Err(CreditsError::Auth {
                reason: format!(
                    "login returned HTTP {}: {}",
                    response.status,
                    response.body_excerpt()
                ),
            });
        }

        let token = parse_login_response(&response.body)?;
        tracing::info!("Authenticated as {}", credentials.access_key_id);
        Ok(token)
    }
}

fn parse_login_response(body: &str) -> Result<AuthToken, CreditsError> {
    let parsed: LoginResponse = serde_json::from_str(body).map_err(|e| CreditsError::Auth {
        reason: format!("login response is not valid JSON: {}", e),
    })?;

    match parsed.token {
        Some(token) if !token.is_empty() => Ok(AuthToken::new(token)),
        _ => Err(CreditsError::Auth {
            reason: "'token' key not found in login response".to_string(),
        }),
    }
}
