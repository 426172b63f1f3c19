//! OAuth2 resource-owner password grant for Reddit script apps.

use crudpanel_core::{CoreError, RedditApiError, RedditCredentials, RedditEndpoints, Secret};
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

/// Reddit issues script-app tokens for one hour.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: Secret,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

/// Exchanges the user's password for a bearer token.
///
/// Any failure, including Reddit's habit of answering a bad password with
/// `200 {"error": "invalid_grant"}`, becomes `AuthenticationFailed`.
pub async fn request_password_token(
    http_client: &Client,
    credentials: &RedditCredentials,
    endpoints: &RedditEndpoints,
) -> Result<RedditToken, CoreError> {
    let auth_base = endpoints.auth_base.trim_end_matches('/');
    let auth_url = AuthUrl::new(format!("{}/api/v1/authorize", auth_base))
        .map_err(|e| CoreError::invalid_input(format!("invalid Reddit auth URL: {}", e)))?;
    let token_url = TokenUrl::new(format!("{}/api/v1/access_token", auth_base))
        .map_err(|e| CoreError::invalid_input(format!("invalid Reddit token URL: {}", e)))?;

    let client = BasicClient::new(
        ClientId::new(credentials.client_id().expose().to_string()),
        Some(ClientSecret::new(
            credentials.client_secret().expose().to_string(),
        )),
        auth_url,
        Some(token_url),
    );

    info!("Requesting Reddit token for u/{}", credentials.username());
    let response = client
        .exchange_password(
            &ResourceOwnerUsername::new(credentials.username().to_string()),
            &ResourceOwnerPassword::new(credentials.password().expose().to_string()),
        )
        .request_async(|request| send_token_request(http_client, request))
        .await
        .map_err(|e| {
            let reason = describe_token_error(&e);
            error!("Reddit token request failed: {}", reason);
            CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
        })?;

    let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
    let scope = response
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
        .unwrap_or_default();

    debug!("Reddit token valid for {:?}", lifetime);
    Ok(RedditToken {
        access_token: Secret::new(response.access_token().secret().clone()),
        expires_at: SystemTime::now() + lifetime,
        scope,
    })
}

/// Sends the token request through the session's own client so it carries
/// the user agent Reddit requires.
async fn send_token_request(
    http_client: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn describe_token_error(error: &RequestTokenError<reqwest::Error, BasicErrorResponse>) -> String {
    match error {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => format!("token request failed: {}", e),
        RequestTokenError::Parse(e, body) => error_field(body)
            .unwrap_or_else(|| format!("unexpected token response: {}", e)),
        RequestTokenError::Other(message) => message.clone(),
    }
}

/// Pulls a readable reason out of a body that was not a token.
fn error_field(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        return Some(error.to_string());
    }
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_extraction() {
        assert_eq!(
            error_field(br#"{"error": "invalid_grant"}"#).as_deref(),
            Some("invalid_grant")
        );
        assert_eq!(
            error_field(br#"{"message": "Unauthorized", "error": 401}"#).as_deref(),
            Some("Unauthorized")
        );
        assert_eq!(error_field(b"<html>nope</html>"), None);
    }

    #[test]
    fn test_token_expiry() {
        let token = RedditToken {
            access_token: Secret::new("abc"),
            expires_at: SystemTime::now() - Duration::from_secs(1),
            scope: vec!["*".to_string()],
        };
        assert!(token.is_expired());
    }
}
