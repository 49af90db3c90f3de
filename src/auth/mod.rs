//! Authentication for the Drive reader.
//!
//! The client never talks to the OAuth endpoints itself. It installs a stored
//! [`Token`] on an [`AuthProvider`] and asks it for fresh request metadata
//! before each API call; whether that triggers a refresh exchange is the
//! provider's decision.
//!
//! # Example
//!
//! ```no_run
//! use integrations_drive_reader::auth::{AuthProvider, OAuth2Provider, Token};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OAuth2Provider::new_with_strings(
//!     "client_id.apps.googleusercontent.com",
//!     "client_secret",
//!     "https://example.com/oauth/callback",
//! );
//! provider.set_credentials(&Token::new("", "refresh_token"));
//!
//! let metadata = provider.get_request_metadata().await?;
//! println!("{}", metadata.authorization_header());
//! # Ok(())
//! # }
//! ```

use crate::errors::AuthenticationError;
use crate::types::GenerateAuthUrlOpts;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default Google OAuth2 token URL.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default Google OAuth2 authorization URL.
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Access tokens this close to expiry are refreshed before use.
pub const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 300;

/// Stored access/refresh token pair supplied by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
}

impl Token {
    /// Creates a token pair.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Credentials currently held by a provider.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Access token, if one has been installed or minted.
    pub access_token: Option<SecretString>,
    /// Refresh token.
    pub refresh_token: Option<SecretString>,
    /// Expiry of the access token, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Builds credentials from a stored token; empty strings count as absent.
    pub fn from_token(token: &Token) -> Self {
        Self {
            access_token: non_empty(&token.access),
            refresh_token: non_empty(&token.refresh),
            expires_at: None,
        }
    }

    /// Exposes the access token.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    /// Exposes the refresh token.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    /// True when the access token is missing or inside the expiry buffer.
    ///
    /// An access token with no known expiry is treated as usable.
    pub fn needs_refresh(&self) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() >= expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS)
            }
            None => false,
        }
    }
}

fn non_empty(value: &str) -> Option<SecretString> {
    if value.is_empty() {
        None
    } else {
        Some(SecretString::new(value.to_string()))
    }
}

/// Credentials to attach to one API request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The token string.
    pub access_token: SecretString,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Expiration time, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl RequestMetadata {
    /// Creates bearer metadata.
    pub fn bearer(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }
}

/// Authorization capability consumed by the client.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Installs a stored token pair. Must not perform network I/O.
    fn set_credentials(&self, token: &Token);

    /// Returns a snapshot of the held credentials.
    fn credentials(&self) -> Credentials;

    /// Returns credentials for a request, refreshing them if needed.
    async fn get_request_metadata(&self) -> Result<RequestMetadata, AuthenticationError>;

    /// Builds the URL for the human consent step.
    fn generate_auth_url(&self, opts: &GenerateAuthUrlOpts) -> String;
}

/// OAuth 2.0 provider for Google's authorization server.
///
/// Credentials sit behind a lock so one provider can be shared by every
/// request a client issues. An installed access token is reused until it
/// enters the expiry buffer; after that the refresh token is exchanged at
/// the token endpoint.
pub struct OAuth2Provider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    token_url: String,
    auth_url: String,
    credentials: RwLock<Credentials>,
    http_client: Client,
}

impl OAuth2Provider {
    /// Creates a new OAuth2 provider.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            token_url: TOKEN_URL.to_string(),
            auth_url: AUTH_URL.to_string(),
            credentials: RwLock::new(Credentials::default()),
            http_client: Client::new(),
        }
    }

    /// Creates a new OAuth2 provider with a string secret.
    pub fn new_with_strings(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self::new(
            client_id,
            SecretString::new(client_secret.into()),
            redirect_uri,
        )
    }

    /// Sets a custom token URL (for testing or custom OAuth2 servers).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Sets a custom authorization URL.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Uses a preconfigured HTTP client for token exchanges.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// The client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<RequestMetadata, AuthenticationError> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            client_id: &'a str,
            client_secret: &'a str,
            refresh_token: &'a str,
            grant_type: &'a str,
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            #[serde(default = "default_token_type")]
            token_type: String,
            expires_in: Option<i64>,
            refresh_token: Option<String>,
        }

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: String,
            error_description: Option<String>,
        }

        let request = RefreshRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            refresh_token,
            grant_type: "refresh_token",
        };

        debug!(token_url = %self.token_url, "Refreshing access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                AuthenticationError::RefreshFailed(format!("HTTP request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Access token refresh rejected");
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&text) {
                let description = error.error_description.unwrap_or_default();
                if error.error == "invalid_grant" {
                    return Err(AuthenticationError::InvalidGrant(description));
                }
                return Err(AuthenticationError::RefreshFailed(format!(
                    "{}: {}",
                    error.error, description
                )));
            }
            return Err(AuthenticationError::RefreshFailed(format!(
                "Token refresh failed with status {}: {}",
                status, text
            )));
        }

        let refresh_response: RefreshResponse = response.json().await.map_err(|e| {
            AuthenticationError::RefreshFailed(format!("Failed to parse response: {}", e))
        })?;

        let expires_at = refresh_response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        {
            let mut credentials = self.credentials.write();
            credentials.access_token =
                Some(SecretString::new(refresh_response.access_token.clone()));
            credentials.expires_at = expires_at;
            if let Some(rotated) = refresh_response.refresh_token {
                credentials.refresh_token = Some(SecretString::new(rotated));
            }
        }

        Ok(RequestMetadata {
            access_token: SecretString::new(refresh_response.access_token),
            token_type: refresh_response.token_type,
            expires_at,
        })
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[async_trait]
impl AuthProvider for OAuth2Provider {
    fn set_credentials(&self, token: &Token) {
        *self.credentials.write() = Credentials::from_token(token);
    }

    fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    async fn get_request_metadata(&self) -> Result<RequestMetadata, AuthenticationError> {
        let snapshot = self.credentials();
        if !snapshot.needs_refresh() {
            if let Some(access) = snapshot.access_token() {
                return Ok(RequestMetadata::bearer(access, snapshot.expires_at));
            }
        }

        let refresh_token = snapshot
            .refresh_token()
            .ok_or(AuthenticationError::MissingRefreshToken)?;

        self.refresh_access_token(refresh_token).await
    }

    fn generate_auth_url(&self, opts: &GenerateAuthUrlOpts) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            (
                "response_type",
                opts.response_type.unwrap_or_default().as_str().to_string(),
            ),
            (
                "client_id",
                opts.client_id.clone().unwrap_or_else(|| self.client_id.clone()),
            ),
            (
                "redirect_uri",
                opts.redirect_uri
                    .clone()
                    .unwrap_or_else(|| self.redirect_uri.clone()),
            ),
        ];

        if let Some(access_type) = opts.access_type {
            pairs.push(("access_type", access_type.as_str().to_string()));
        }
        if let Some(prompt) = opts.prompt {
            pairs.push(("prompt", prompt.as_str().to_string()));
        }
        if !opts.scope.is_empty() {
            let scope = opts
                .scope
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            pairs.push(("scope", scope));
        }
        if let Some(state) = &opts.state {
            pairs.push(("state", state.clone()));
        }
        if let Some(include) = opts.include_granted_scopes {
            pairs.push(("include_granted_scopes", include.to_string()));
        }
        if let Some(hint) = &opts.login_hint {
            pairs.push(("login_hint", hint.clone()));
        }
        if let Some(challenge) = &opts.code_challenge {
            pairs.push(("code_challenge", challenge.clone()));
        }
        if let Some(method) = opts.code_challenge_method {
            pairs.push(("code_challenge_method", method.as_str().to_string()));
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        format!("{}?{}", self.auth_url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessType, AuthPrompt, CodeChallengeMethod, Scope};

    fn provider() -> OAuth2Provider {
        OAuth2Provider::new_with_strings("client-id", "secret", "https://example.com/cb")
    }

    #[test]
    fn test_set_credentials_installs_token() {
        let provider = provider();
        provider.set_credentials(&Token::new("access", "refresh"));

        let credentials = provider.credentials();
        assert_eq!(credentials.access_token(), Some("access"));
        assert_eq!(credentials.refresh_token(), Some("refresh"));
        assert!(credentials.expires_at.is_none());
    }

    #[test]
    fn test_needs_refresh() {
        let credentials = Credentials::from_token(&Token::new("", "refresh"));
        assert!(credentials.needs_refresh());

        let mut credentials = Credentials::from_token(&Token::new("access", "refresh"));
        assert!(!credentials.needs_refresh());

        credentials.expires_at = Some(Utc::now() + Duration::minutes(4));
        assert!(credentials.needs_refresh());

        credentials.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!credentials.needs_refresh());
    }

    #[tokio::test]
    async fn test_installed_access_token_used_without_refresh() {
        // The token URL is unroutable: any refresh attempt would fail.
        let provider = provider().with_token_url("http://127.0.0.1:9/token");
        provider.set_credentials(&Token::new("access", "refresh"));

        let metadata = provider.get_request_metadata().await.unwrap();
        assert_eq!(metadata.authorization_header(), "Bearer access");
    }

    #[tokio::test]
    async fn test_missing_refresh_token() {
        let provider = provider();
        let result = provider.get_request_metadata().await;
        assert!(matches!(result, Err(AuthenticationError::MissingRefreshToken)));
    }

    #[test]
    fn test_generate_auth_url() {
        let provider = provider();
        let opts = GenerateAuthUrlOpts {
            access_type: Some(AccessType::Offline),
            prompt: Some(AuthPrompt::Consent),
            scope: vec![Scope::DriveReadOnly, Scope::DriveMetadataReadOnly],
            ..Default::default()
        };

        let url = provider.generate_auth_url(&opts);
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcb"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive.readonly+https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive.metadata.readonly"
        ));
        assert_eq!(url, provider.generate_auth_url(&opts));
    }

    #[test]
    fn test_generate_auth_url_optional_params() {
        let provider = provider().with_auth_url("https://auth.example.com/authorize");
        let opts = GenerateAuthUrlOpts {
            state: Some("xyz".to_string()),
            login_hint: Some("user@example.com".to_string()),
            include_granted_scopes: Some(true),
            code_challenge: Some("challenge".to_string()),
            code_challenge_method: Some(CodeChallengeMethod::S256),
            ..Default::default()
        };

        let url = provider.generate_auth_url(&opts);
        assert!(url.starts_with("https://auth.example.com/authorize?"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("login_hint=user%40example.com"));
        assert!(url.contains("include_granted_scopes=true"));
        assert!(url.contains("code_challenge=challenge"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(!url.contains("scope="));
        assert!(!url.contains("access_type"));
    }
}
