//! Google Drive Reader
//!
//! A small client for reading files out of a single Google Drive folder via
//! the Drive REST API v3. It keeps OAuth 2.0 access fresh, resolves file
//! names to IDs inside the configured folder and downloads file content.
//!
//! # Features
//!
//! - **Name lookups**: Find a file by name within a folder and read its text
//! - **Listing**: Run arbitrary `files.list` queries
//! - **Downloads**: Fetch content by file ID, as bytes, text or JSON
//! - **Authentication**: OAuth 2.0 refresh-token flow and consent URL generation
//! - **Events**: Broadcast notifications for token refreshes and found files
//! - **Caching**: Optional byte-bounded cache of name lookups
//!
//! # Example
//!
//! ```no_run
//! use integrations_drive_reader::{AuthConfig, ClientConfig, DriveClient, Token};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .folder_id("folder_id")
//!     .auth(
//!         AuthConfig::new("client_id", "client_secret", "https://example.com/cb")
//!             .with_token(Token::new("access_token", "refresh_token")),
//!     )
//!     .build()?;
//!
//! let client = DriveClient::new(config)?;
//!
//! let mut events = client.subscribe();
//! let text = client.read_file_by_name("report.csv").await?;
//! println!("{}", text);
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event.kind);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Core modules
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod services;
pub mod transport;
pub mod types;

// Test doubles, public so downstream crates can drive a client offline
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthProvider, OAuth2Provider, Token};
pub use client::{DriveClient, DriveClientBuilder, FromDriveContent};
pub use config::{AuthConfig, ClientConfig, ClientConfigBuilder};
pub use errors::{DriveError, DriveResult};
pub use events::{DriveEvent, EventType};
pub use types::{DriveFile, GetFileParams, ListFilesParams, Scope};

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use integrations_drive_reader::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{DriveClient, DriveClientBuilder, FromDriveContent};

    // Configuration
    pub use crate::config::{AuthConfig, ClientConfig, ClientConfigBuilder};

    // Authentication
    pub use crate::auth::{AuthProvider, OAuth2Provider, Token};

    // Services
    pub use crate::services::{DriveApi, RestDriveApi};

    // Events
    pub use crate::events::{DriveEvent, EventEmitter, EventType};

    // Common types
    pub use crate::types::{
        AccessType, AuthPrompt, Corpora, DriveFile, FileListData, GenerateAuthUrlOpts,
        GetFileParams, ListFilesParams, QuerySpace, ResponseAlt, Scope, SortBy,
    };

    // Errors
    pub use crate::errors::{DriveError, DriveResult};
}
