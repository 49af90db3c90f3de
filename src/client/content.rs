//! Decoding of downloaded file content.

use crate::errors::{DriveResult, ResponseError};
use bytes::Bytes;

/// Types a downloaded file body can be decoded into.
pub trait FromDriveContent: Sized {
    /// Decodes the raw body.
    fn from_content(content: Bytes) -> DriveResult<Self>;
}

impl FromDriveContent for Bytes {
    fn from_content(content: Bytes) -> DriveResult<Self> {
        Ok(content)
    }
}

impl FromDriveContent for Vec<u8> {
    fn from_content(content: Bytes) -> DriveResult<Self> {
        Ok(content.to_vec())
    }
}

impl FromDriveContent for String {
    fn from_content(content: Bytes) -> DriveResult<Self> {
        String::from_utf8(content.to_vec()).map_err(|e| {
            ResponseError::DeserializationError(format!("File content is not UTF-8: {}", e)).into()
        })
    }
}

impl FromDriveContent for serde_json::Value {
    fn from_content(content: Bytes) -> DriveResult<Self> {
        serde_json::from_slice(&content).map_err(|e| {
            ResponseError::DeserializationError(format!("File content is not JSON: {}", e)).into()
        })
    }
}
