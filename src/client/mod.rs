//! Drive reader client implementation.

use crate::auth::{AuthProvider, OAuth2Provider, Token};
use crate::cache::{CacheEntry, FileCache};
use crate::config::ClientConfig;
use crate::errors::{DriveError, DriveResult, ResponseError};
use crate::events::{DriveEvent, EventEmitter, EventType, DEFAULT_EVENT_CAPACITY};
use crate::services::{DriveApi, RestDriveApi};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{
    AccessType, AuthPrompt, DriveFile, GenerateAuthUrlOpts, GetFileParams, ListFilesParams,
    QuerySpace, ResponseAlt,
};
use bytes::Bytes;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

mod content;
pub use content::FromDriveContent;

/// Timeout applied to every content download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Google Drive reader client.
///
/// Lists files in a folder and downloads their content, refreshing access
/// through its [`AuthProvider`] before every call and reporting progress as
/// [`DriveEvent`]s. Every operation is a single request/response exchange:
/// nothing is retried and result pages are not followed.
pub struct DriveClient {
    config: ClientConfig,
    auth: Arc<dyn AuthProvider>,
    transport: Arc<dyn HttpTransport>,
    drive: OnceLock<Arc<dyn DriveApi>>,
    cache: Option<FileCache>,
    events: EventEmitter,
}

impl DriveClient {
    /// Creates a client with the default OAuth provider and REST transport.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use integrations_drive_reader::{AuthConfig, ClientConfig, DriveClient, Token};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ClientConfig::builder()
    ///     .folder_id("folder_id")
    ///     .auth(
    ///         AuthConfig::new("client_id", "client_secret", "https://example.com/cb")
    ///             .with_token(Token::new("access_token", "refresh_token")),
    ///     )
    ///     .build()?;
    ///
    /// let client = DriveClient::new(config)?;
    /// let text = client.read_file_by_name("notes.txt").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ClientConfig) -> DriveResult<Self> {
        DriveClientBuilder::new().config(config).build()
    }

    /// Creates a builder for injecting collaborators.
    pub fn builder() -> DriveClientBuilder {
        DriveClientBuilder::new()
    }

    /// The Drive API handle, built on first use and kept for the client's lifetime.
    pub fn drive(&self) -> &Arc<dyn DriveApi> {
        self.drive.get_or_init(|| {
            debug!(base_url = %self.config.base_url, "Creating Drive API handle");
            Arc::new(
                RestDriveApi::new(
                    self.config.base_url.clone(),
                    self.transport.clone(),
                    self.auth.clone(),
                )
                .with_api_key(self.config.api_key.clone()),
            )
        })
    }

    /// The token supplied in configuration.
    ///
    /// Tokens minted later by the auth provider are not reflected here.
    pub fn token(&self) -> Option<&Token> {
        self.config.auth.token.as_ref()
    }

    /// URL for the human consent step, requesting offline access.
    pub fn authorization_url(&self) -> String {
        self.auth.generate_auth_url(&GenerateAuthUrlOpts {
            access_type: Some(AccessType::Offline),
            prompt: Some(AuthPrompt::Consent),
            scope: self.config.scope.clone(),
            ..Default::default()
        })
    }

    /// The configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The authorization provider.
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// The record of the latest name resolutions, if enabled.
    pub fn cache(&self) -> Option<&FileCache> {
        self.cache.as_ref()
    }

    /// The event emitter.
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DriveEvent> {
        self.events.subscribe()
    }

    /// Obtains fresh request metadata from the auth provider.
    ///
    /// Emits `RefreshedAccessToken` on success. On failure emits
    /// `RefreshTokenError` and returns the provider's error unchanged.
    pub async fn ensure_access(&self) -> DriveResult<()> {
        match self.auth.get_request_metadata().await {
            Ok(_) => {
                self.events.emit(DriveEvent::new(EventType::RefreshedAccessToken));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to obtain access token");
                self.events.emit(DriveEvent::new(EventType::RefreshTokenError));
                Err(e.into())
            }
        }
    }

    /// Lists files matching `params`.
    ///
    /// An empty list is a valid result. A successful response without a
    /// `files` array is an error.
    pub async fn get_file_list(&self, params: &ListFilesParams) -> DriveResult<Vec<DriveFile>> {
        self.ensure_access().await?;

        let response = self.drive().list_files(params).await?;
        if !response.status.is_success() {
            return Err(DriveError::Status(response.status));
        }

        match response.data.and_then(|data| data.files) {
            Some(files) => {
                debug!(q = %params.q, count = files.len(), "Listed files");
                Ok(files)
            }
            None => Err(ResponseError::MissingFileList.into()),
        }
    }

    /// Fetches a single file and returns its raw body.
    ///
    /// Emits `FoundFile` carrying `file_name` when data is returned.
    pub async fn get_file_content(
        &self,
        params: &GetFileParams,
        file_name: Option<&str>,
    ) -> DriveResult<Bytes> {
        self.ensure_access().await?;

        let response = self.drive().get_file(params).await?;
        if !response.status.is_success() {
            return Err(DriveError::Status(response.status));
        }

        match response.data {
            Some(data) => {
                debug!(file_id = %params.file_id, bytes = data.len(), "Fetched file content");
                self.events.emit(DriveEvent::with_file_name(
                    EventType::FoundFile,
                    file_name.map(String::from),
                ));
                Ok(data)
            }
            None => Err(ResponseError::NoData {
                file_name: file_name.map(String::from),
            }
            .into()),
        }
    }

    /// Fetches a single file and decodes its body as `T`.
    pub async fn get_file_content_as<T: FromDriveContent>(
        &self,
        params: &GetFileParams,
        file_name: Option<&str>,
    ) -> DriveResult<T> {
        let content = self.get_file_content(params, file_name).await?;
        T::from_content(content)
    }

    /// Reads the text of the first file named `file_name` in the configured folder.
    ///
    /// Fails with a not-found error when nothing matches. The `FileNotFound`
    /// event is not emitted, and the name is not passed on to the download,
    /// so the resulting `FoundFile` event carries no file name.
    ///
    /// The name is resolved with a fresh `files.list` query on every call.
    /// The cache only records the latest resolution.
    pub async fn read_file_by_name(&self, file_name: &str) -> DriveResult<String> {
        self.ensure_access().await?;

        let params = ListFilesParams::new(self.name_query(file_name)).space(QuerySpace::Drive);
        let files = self.get_file_list(&params).await?;

        let Some(first) = files.into_iter().next() else {
            debug!(file_name, "No file matched name");
            if let Some(cache) = &self.cache {
                cache.remove(file_name);
            }
            return Err(DriveError::not_found(file_name));
        };

        let file_id = first.id;
        debug!(file_name, file_id = %file_id, "Resolved file name");
        if let Some(cache) = &self.cache {
            cache.insert(CacheEntry::new(file_name, file_id.clone()));
        }

        let result = self.read_file_by_id(&file_id, None).await;
        if result.is_err() {
            if let Some(cache) = &self.cache {
                cache.remove(file_name);
            }
        }
        result
    }

    /// Downloads a file's content as text.
    pub async fn read_file_by_id(
        &self,
        file_id: &str,
        file_name: Option<&str>,
    ) -> DriveResult<String> {
        self.ensure_access().await?;

        let params = GetFileParams {
            alt: Some(ResponseAlt::Media),
            timeout: Some(DOWNLOAD_TIMEOUT),
            ..GetFileParams::new(file_id)
        };

        self.get_file_content_as::<String>(&params, file_name).await
    }

    /// Query matching `file_name` inside the configured folder.
    pub fn name_query(&self, file_name: &str) -> String {
        format!(
            "name = '{}' and '{}' in parents",
            escape_query_value(file_name),
            escape_query_value(&self.config.folder_id)
        )
    }
}

/// Escapes a string literal for a Drive search query.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builder for [`DriveClient`].
///
/// Collaborators left unset fall back to the REST implementations.
pub struct DriveClientBuilder {
    config: Option<ClientConfig>,
    auth: Option<Arc<dyn AuthProvider>>,
    transport: Option<Arc<dyn HttpTransport>>,
    drive: Option<Arc<dyn DriveApi>>,
    event_capacity: usize,
}

impl DriveClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            auth: None,
            transport: None,
            drive: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `provider` instead of an [`OAuth2Provider`] built from the config.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Uses a shared auth provider.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Uses `transport` for the lazily built REST handle.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Installs a ready Drive API handle instead of building one lazily.
    pub fn drive_api(mut self, drive: Arc<dyn DriveApi>) -> Self {
        self.drive = Some(drive);
        self
    }

    /// Sets how many undelivered events each subscriber may buffer.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Builds the client.
    ///
    /// A configured token is installed on the auth provider; no network
    /// call is made.
    pub fn build(self) -> DriveResult<DriveClient> {
        let config = self.config.ok_or_else(|| {
            DriveError::configuration("client configuration is required")
        })?;
        config.validate()?;

        let auth = match self.auth {
            Some(auth) => auth,
            None => Arc::new(
                OAuth2Provider::new_with_strings(
                    config.auth.client_id.clone(),
                    config.auth.secret.clone(),
                    config.auth.callback.clone(),
                )
                .with_token_url(config.token_url.clone()),
            ),
        };

        if let Some(token) = &config.auth.token {
            auth.set_credentials(token);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::with_defaults(config.timeout, &config.user_agent).map_err(
                    |e| DriveError::configuration(format!("Failed to create transport: {}", e)),
                )?,
            ),
        };

        let cache = if config.use_cache {
            Some(FileCache::new(config.cache_size))
        } else {
            None
        };

        let drive = OnceLock::new();
        if let Some(api) = self.drive {
            let _ = drive.set(api);
        }

        debug!(
            folder_id = %config.folder_id,
            use_cache = config.use_cache,
            cache_size = config.cache_size,
            "Created Drive client"
        );

        Ok(DriveClient {
            config,
            auth,
            transport,
            drive,
            cache,
            events: EventEmitter::new(self.event_capacity),
        })
    }
}

impl Default for DriveClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
