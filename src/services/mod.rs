//! Drive API capability consumed by the client.

use crate::errors::DriveResult;
use crate::types::{ApiResponse, FileListData, GetFileParams, ListFilesParams};
use async_trait::async_trait;
use bytes::Bytes;

mod files;

pub use files::RestDriveApi;

/// Authenticated access to the Drive `files` resource.
///
/// Implementations perform the network exchange and report every completed
/// exchange as an [`ApiResponse`], whatever its status. Interpreting the
/// status and payload is left to the caller.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// `files.list`
    async fn list_files(&self, params: &ListFilesParams)
        -> DriveResult<ApiResponse<FileListData>>;

    /// `files.get`
    async fn get_file(&self, params: &GetFileParams) -> DriveResult<ApiResponse<Bytes>>;
}
