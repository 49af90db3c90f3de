//! REST implementation of the Drive `files` resource.

use super::DriveApi;
use crate::auth::AuthProvider;
use crate::errors::{AuthenticationError, DriveResult, ResponseError, TransportError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::{ApiResponse, FileListData, GetFileParams, ListFilesParams};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use std::sync::Arc;
use tracing::trace;
use url::Url;

/// Drive API handle that talks to the v3 REST endpoints.
pub struct RestDriveApi {
    base_url: Url,
    api_key: Option<String>,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl RestDriveApi {
    /// Creates a handle for `base_url` (for example `https://www.googleapis.com/drive/v3`).
    pub fn new(
        base_url: Url,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            base_url,
            api_key: None,
            transport,
            auth,
        }
    }

    /// Appends `key=<api_key>` to every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() { None } else { Some(api_key) };
        self
    }

    /// Builds the URL for `files` or `files/{id}`.
    pub fn files_url(&self, file_id: Option<&str>) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::InvalidRequest(format!("Invalid base URL: {}", self.base_url))
            })?;
            segments.pop_if_empty().push("files");
            if let Some(id) = file_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn append_key(&self, url: &mut Url) {
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
    }

    async fn send_authorized(&self, mut request: HttpRequest) -> DriveResult<HttpResponse> {
        let metadata = self.auth.get_request_metadata().await?;
        let header = HeaderValue::from_str(&metadata.authorization_header()).map_err(|e| {
            AuthenticationError::InvalidToken(format!("Invalid auth header: {}", e))
        })?;
        request.headers.insert(AUTHORIZATION, header);

        trace!(method = %request.method, url = %request.url, "Sending Drive request");
        let response = self.transport.send(request).await?;
        trace!(status = %response.status, bytes = response.body.len(), "Drive response received");

        Ok(response)
    }
}

#[async_trait]
impl DriveApi for RestDriveApi {
    async fn list_files(
        &self,
        params: &ListFilesParams,
    ) -> DriveResult<ApiResponse<FileListData>> {
        let mut url = self.files_url(None)?;
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid list parameters: {}", e)))?;
        url.set_query(Some(&query));
        self.append_key(&mut url);

        let mut request = HttpRequest::get(url);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self.send_authorized(request).await?;

        if !response.status.is_success() || response.body.is_empty() {
            return Ok(ApiResponse::new(response.status, None));
        }

        let data: FileListData = serde_json::from_slice(&response.body).map_err(|e| {
            ResponseError::DeserializationError(format!("Failed to deserialize file list: {}", e))
        })?;

        Ok(ApiResponse::new(response.status, Some(data)))
    }

    async fn get_file(&self, params: &GetFileParams) -> DriveResult<ApiResponse<Bytes>> {
        let mut url = self.files_url(Some(&params.file_id))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        self.append_key(&mut url);
        if url.query() == Some("") {
            url.set_query(None);
        }

        let mut request = HttpRequest::get(url);
        request.timeout = params.timeout;

        let response = self.send_authorized(request).await?;

        let data = if response.body.is_empty() {
            None
        } else {
            Some(response.body)
        };

        Ok(ApiResponse::new(response.status, data))
    }
}
