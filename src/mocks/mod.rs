//! Mock implementations for testing.
//!
//! These stand in for the two external collaborators of
//! [`DriveClient`](crate::DriveClient) so its request/response handling and
//! event emission can be exercised without network access.

use crate::auth::{AuthProvider, Credentials, RequestMetadata, Token};
use crate::errors::{AuthenticationError, DriveResult, TransportError};
use crate::services::DriveApi;
use crate::types::{
    ApiResponse, DriveFile, FileListData, GenerateAuthUrlOpts, GetFileParams, ListFilesParams,
};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock authorization provider.
///
/// Hands out a fixed bearer token, or fails every refresh when built with
/// [`MockAuthProvider::failing`]. No network I/O is ever performed.
pub struct MockAuthProvider {
    credentials: Mutex<Credentials>,
    installed: Mutex<Vec<Token>>,
    failure: Option<String>,
    metadata_calls: AtomicUsize,
}

impl MockAuthProvider {
    /// Creates a provider that always succeeds.
    pub fn new() -> Self {
        Self {
            credentials: Mutex::new(Credentials::default()),
            installed: Mutex::new(Vec::new()),
            failure: None,
            metadata_calls: AtomicUsize::new(0),
        }
    }

    /// Creates a provider whose refresh always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Number of `get_request_metadata` calls so far.
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `set_credentials`, in order.
    pub fn installed_tokens(&self) -> Vec<Token> {
        self.installed.lock().clone()
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    fn set_credentials(&self, token: &Token) {
        self.installed.lock().push(token.clone());
        *self.credentials.lock() = Credentials::from_token(token);
    }

    fn credentials(&self) -> Credentials {
        self.credentials.lock().clone()
    }

    async fn get_request_metadata(&self) -> Result<RequestMetadata, AuthenticationError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AuthenticationError::RefreshFailed(message.clone()));
        }
        let access = self
            .credentials
            .lock()
            .access_token()
            .unwrap_or("mock-access-token")
            .to_string();
        Ok(RequestMetadata::bearer(access, None))
    }

    fn generate_auth_url(&self, opts: &GenerateAuthUrlOpts) -> String {
        let scope = opts
            .scope
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "mock://auth?access_type={}&prompt={}&scope={}",
            opts.access_type.map(|a| a.as_str()).unwrap_or(""),
            opts.prompt.map(|p| p.as_str()).unwrap_or(""),
            scope
        )
    }
}

/// Mock Drive API.
///
/// Tests enqueue responses for `files.list` and `files.get`; each call pops
/// the next one and records its parameters. An empty queue yields a
/// transport error.
#[derive(Default)]
pub struct MockDriveApi {
    list_responses: Mutex<VecDeque<DriveResult<ApiResponse<FileListData>>>>,
    get_responses: Mutex<VecDeque<DriveResult<ApiResponse<Bytes>>>>,
    list_requests: Mutex<Vec<ListFilesParams>>,
    get_requests: Mutex<Vec<GetFileParams>>,
}

impl MockDriveApi {
    /// Creates a mock with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw `files.list` result.
    pub fn enqueue_list(&self, response: DriveResult<ApiResponse<FileListData>>) {
        self.list_responses.lock().push_back(response);
    }

    /// Enqueues a 200 `files.list` response containing `files`.
    pub fn enqueue_files(&self, files: Vec<DriveFile>) {
        self.enqueue_list(Ok(ApiResponse::ok(FileListData {
            kind: Some("drive#fileList".to_string()),
            files: Some(files),
            ..Default::default()
        })));
    }

    /// Enqueues a raw `files.get` result.
    pub fn enqueue_get(&self, response: DriveResult<ApiResponse<Bytes>>) {
        self.get_responses.lock().push_back(response);
    }

    /// Enqueues a 200 `files.get` response with `content`.
    pub fn enqueue_content(&self, content: impl Into<Bytes>) {
        self.enqueue_get(Ok(ApiResponse::ok(content.into())));
    }

    /// Enqueues a bodiless `files.get` response with `status`.
    pub fn enqueue_get_status(&self, status: StatusCode) {
        self.enqueue_get(Ok(ApiResponse::new(status, None)));
    }

    /// Parameters of every `files.list` call.
    pub fn list_requests(&self) -> Vec<ListFilesParams> {
        self.list_requests.lock().clone()
    }

    /// Parameters of every `files.get` call.
    pub fn get_requests(&self) -> Vec<GetFileParams> {
        self.get_requests.lock().clone()
    }
}

/// Builds a file value with `kind` and `mime_type` filled in.
pub fn drive_file(id: &str, name: &str) -> DriveFile {
    DriveFile {
        kind: "drive#file".to_string(),
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "text/plain".to_string(),
    }
}

fn unconfigured(call: &str) -> crate::errors::DriveError {
    TransportError::Network(format!("No {} response configured in MockDriveApi", call)).into()
}

#[async_trait]
impl DriveApi for MockDriveApi {
    async fn list_files(
        &self,
        params: &ListFilesParams,
    ) -> DriveResult<ApiResponse<FileListData>> {
        self.list_requests.lock().push(params.clone());
        self.list_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(unconfigured("files.list")))
    }

    async fn get_file(&self, params: &GetFileParams) -> DriveResult<ApiResponse<Bytes>> {
        self.get_requests.lock().push(params.clone());
        self.get_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(unconfigured("files.get")))
    }
}
