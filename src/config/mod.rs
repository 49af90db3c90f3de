//! Configuration for the Drive reader client.
//!
//! Every optional field has a default; anything set explicitly, through the
//! builder or in deserialized input, wins over it.

use crate::auth::Token;
use crate::cache::DEFAULT_CACHE_SIZE;
use crate::errors::{ConfigurationError, DriveError, DriveResult};
use crate::types::Scope;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default Drive v3 API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Scopes requested when none are configured.
pub fn default_scopes() -> Vec<Scope> {
    vec![Scope::DriveReadOnly, Scope::DriveMetadataReadOnly]
}

/// OAuth application settings plus an optional stored token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// OAuth client ID.
    #[serde(rename = "clientID", alias = "clientId")]
    pub client_id: String,

    /// OAuth client secret.
    pub secret: String,

    /// Redirect URI registered for the client.
    pub callback: String,

    /// Previously obtained token pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl AuthConfig {
    /// Creates auth settings without a token.
    pub fn new(
        client_id: impl Into<String>,
        secret: impl Into<String>,
        callback: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            callback: callback.into(),
            token: None,
        }
    }

    /// Attaches a stored token.
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

/// Configuration for [`DriveClient`](crate::DriveClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// API key appended to requests when non-empty.
    #[serde(default)]
    pub api_key: String,

    /// Folder searched by name lookups.
    #[serde(rename = "folderID", alias = "folderId")]
    pub folder_id: String,

    /// OAuth settings.
    pub auth: AuthConfig,

    /// Whether to keep a name resolution cache.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,

    /// Cache budget in bytes.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Scopes requested in the authorization URL.
    #[serde(default = "default_scopes", deserialize_with = "one_or_many")]
    pub scope: Vec<Scope>,

    /// Drive API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Default timeout for API requests.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

fn default_use_cache() -> bool {
    true
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_token_url() -> String {
    crate::auth::TOKEN_URL.to_string()
}

fn default_user_agent() -> String {
    format!("integrations-drive-reader/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

/// Accepts a single scope or a list of scopes.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Scope>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Scope),
        Many(Vec<Scope>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(scope) => vec![scope],
        OneOrMany::Many(scopes) => scopes,
    })
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Parses a JSON configuration, filling in defaults.
    pub fn from_json(json: &str) -> DriveResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            DriveError::Configuration(ConfigurationError::InvalidConfiguration(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DriveResult<()> {
        if self.auth.client_id.is_empty() {
            return Err(DriveError::Configuration(
                ConfigurationError::MissingCredentials("client ID is required".to_string()),
            ));
        }

        if self.folder_id.is_empty() {
            return Err(DriveError::Configuration(
                ConfigurationError::InvalidConfiguration("folder ID is required".to_string()),
            ));
        }

        if self.scope.is_empty() {
            return Err(DriveError::Configuration(ConfigurationError::MissingScope(
                "at least one scope is required".to_string(),
            )));
        }

        if self.use_cache && self.cache_size == 0 {
            return Err(DriveError::configuration(
                "cache size must be greater than zero when caching is enabled",
            ));
        }

        if self.base_url.cannot_be_a_base() {
            return Err(DriveError::configuration("base URL cannot be a base"));
        }

        Ok(())
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    api_key: String,
    folder_id: Option<String>,
    auth: Option<AuthConfig>,
    use_cache: bool,
    cache_size: usize,
    scope: Vec<Scope>,
    base_url: Option<String>,
    token_url: String,
    user_agent: Option<String>,
    timeout: Duration,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            api_key: String::new(),
            folder_id: None,
            auth: None,
            use_cache: default_use_cache(),
            cache_size: default_cache_size(),
            scope: default_scopes(),
            base_url: None,
            token_url: default_token_url(),
            user_agent: None,
            timeout: default_timeout(),
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the folder searched by name lookups.
    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    /// Sets the OAuth settings.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Enables or disables the cache.
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Sets the cache budget in bytes.
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = bytes;
        self
    }

    /// Replaces the requested scopes.
    pub fn scope(mut self, scope: impl IntoIterator<Item = Scope>) -> Self {
        self.scope = scope.into_iter().collect();
        self
    }

    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the OAuth token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DriveResult<ClientConfig> {
        let auth = self.auth.ok_or_else(|| {
            DriveError::Configuration(ConfigurationError::MissingCredentials(
                "auth configuration is required".to_string(),
            ))
        })?;

        let base_url = match self.base_url {
            Some(url) => Url::parse(&url)
                .map_err(|e| DriveError::configuration(format!("Invalid base URL: {}", e)))?,
            None => default_base_url(),
        };

        let config = ClientConfig {
            api_key: self.api_key,
            folder_id: self.folder_id.unwrap_or_default(),
            auth,
            use_cache: self.use_cache,
            cache_size: self.cache_size,
            scope: self.scope,
            base_url,
            token_url: self.token_url,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            timeout: self.timeout,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
