//! Type definitions for the Google Drive v3 API surface this crate touches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Google Drive file representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Resource kind (always "drive#file").
    #[serde(default)]
    pub kind: String,

    /// File ID.
    pub id: String,

    /// File name.
    #[serde(default)]
    pub name: String,

    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
}

/// Body of a `files.list` response.
///
/// `files` stays optional so a successful response without the array can be
/// told apart from an empty result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListData {
    /// Resource kind (always "drive#fileList").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Whether the search was incomplete.
    #[serde(default)]
    pub incomplete_search: bool,

    /// Next page token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,

    /// Matching files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<DriveFile>>,
}

/// Status and payload of a completed API exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status: reqwest::StatusCode,
    /// Decoded body, absent when the server sent none.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a response.
    pub fn new(status: reqwest::StatusCode, data: Option<T>) -> Self {
        Self { status, data }
    }

    /// Creates a 200 response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self::new(reqwest::StatusCode::OK, Some(data))
    }
}

/// Google access scopes.
///
/// These values inform the consent screen Google shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Full access to Drive files.
    #[serde(rename = "https://www.googleapis.com/auth/drive")]
    DriveReadWrite,
    /// Access to file metadata (read/write).
    #[serde(rename = "https://www.googleapis.com/auth/drive.metadata")]
    DriveMetadata,
    /// Read-only access to file metadata and content.
    #[serde(rename = "https://www.googleapis.com/auth/drive.readonly")]
    DriveReadOnly,
    /// Read-only access to file metadata (no content).
    #[serde(rename = "https://www.googleapis.com/auth/drive.metadata.readonly")]
    DriveMetadataReadOnly,
    /// Read-only access to Google Photos.
    #[serde(rename = "https://www.googleapis.com/auth/drive.photos.readonly")]
    PhotoReadOnly,
    /// Calendar access.
    #[serde(rename = "https://www.googleapis.com/auth/calendar")]
    Calendar,
}

impl Scope {
    /// Returns the scope URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriveReadWrite => "https://www.googleapis.com/auth/drive",
            Self::DriveMetadata => "https://www.googleapis.com/auth/drive.metadata",
            Self::DriveReadOnly => "https://www.googleapis.com/auth/drive.readonly",
            Self::DriveMetadataReadOnly => {
                "https://www.googleapis.com/auth/drive.metadata.readonly"
            }
            Self::PhotoReadOnly => "https://www.googleapis.com/auth/drive.photos.readonly",
            Self::Calendar => "https://www.googleapis.com/auth/calendar",
        }
    }
}

/// Whether the application can refresh tokens while the user is away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
    /// Return a refresh token on the first code exchange.
    Offline,
    /// Default Google behavior.
    #[default]
    Online,
}

impl AccessType {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

/// Prompts to present to the user during authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPrompt {
    /// Do not display any authentication or consent screens.
    None,
    /// Prompt the user for consent.
    Consent,
    /// Prompt the user to select an account.
    SelectAccount,
}

impl AuthPrompt {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        }
    }
}

/// OAuth response type requested from the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Authorization code grant.
    #[default]
    Code,
}

impl ResponseType {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
        }
    }
}

/// Encoding used for a PKCE `code_verifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    /// Verifier sent as-is.
    Plain,
    /// SHA-256 of the verifier.
    S256,
}

impl CodeChallengeMethod {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

/// Options for building an authorization URL.
#[derive(Debug, Clone, Default)]
pub struct GenerateAuthUrlOpts {
    /// Access type.
    pub access_type: Option<AccessType>,
    /// Response type (defaults to `code`).
    pub response_type: Option<ResponseType>,
    /// Overrides the provider's client ID.
    pub client_id: Option<String>,
    /// Overrides the provider's redirect URI.
    pub redirect_uri: Option<String>,
    /// Requested scopes.
    pub scope: Vec<Scope>,
    /// Opaque value echoed back on the redirect.
    pub state: Option<String>,
    /// Incremental authorization.
    pub include_granted_scopes: Option<bool>,
    /// Email or subject hint.
    pub login_hint: Option<String>,
    /// Prompt behavior.
    pub prompt: Option<AuthPrompt>,
    /// PKCE challenge method.
    pub code_challenge_method: Option<CodeChallengeMethod>,
    /// PKCE challenge.
    pub code_challenge: Option<String>,
}

/// Sort keys accepted by `orderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// `createdTime`
    CreateTime,
    /// `folder`
    Folder,
    /// `modifiedByMeTime`
    ModifiedByMeTime,
    /// `modifiedTime`
    ModifiedTime,
    /// `name`
    Name,
    /// `name_natural`
    NaturalName,
    /// `quotaBytesUsed`
    QuotaBytesUsed,
    /// `recency`
    Recency,
    /// `sharedWithMeTime`
    SharedWithMeTime,
    /// `starred`
    Starred,
    /// `viewedByMeTime`
    ViewedByMeTime,
}

impl SortBy {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTime => "createdTime",
            Self::Folder => "folder",
            Self::ModifiedByMeTime => "modifiedByMeTime",
            Self::ModifiedTime => "modifiedTime",
            Self::Name => "name",
            Self::NaturalName => "name_natural",
            Self::QuotaBytesUsed => "quotaBytesUsed",
            Self::Recency => "recency",
            Self::SharedWithMeTime => "sharedWithMeTime",
            Self::Starred => "starred",
            Self::ViewedByMeTime => "viewedByMeTime",
        }
    }

    /// Builds an `orderBy` value from keys and descending flags.
    pub fn order_by(keys: &[(SortBy, bool)]) -> String {
        keys.iter()
            .map(|(key, desc)| {
                if *desc {
                    format!("{} desc", key.as_str())
                } else {
                    key.as_str().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Item-type scope of a file query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySpace {
    /// User drive.
    Drive,
    /// Photos.
    Photos,
    /// Application data folder.
    AppDataFolder,
}

impl QuerySpace {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Photos => "photos",
            Self::AppDataFolder => "appDataFolder",
        }
    }
}

/// Owner scope of a file query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corpora {
    /// Files owned by or shared with the user.
    User,
    /// Files shared to the user's domain.
    Domain,
    /// Files in one team drive.
    TeamDrive,
    /// All team drives plus the user corpus.
    AllTeamDrives,
}

impl Corpora {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Domain => "domain",
            Self::TeamDrive => "teamDrive",
            Self::AllTeamDrives => "allTeamDrives,user",
        }
    }
}

/// Response mode of `files.get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAlt {
    /// Raw file bytes.
    Media,
}

impl ResponseAlt {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Media => "media",
        }
    }
}

/// Parameters for listing files.
///
/// Values are passed through to the API verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesParams {
    /// Search query.
    pub q: String,

    /// Corpora to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpora: Option<String>,

    /// Include team drive items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_team_drive_items: Option<bool>,

    /// Comma separated sort keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Page token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    /// Comma separated spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spaces: Option<String>,

    /// Whether the caller supports team drives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_team_drives: Option<bool>,

    /// Team drive to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_drive_id: Option<String>,

    /// Include corpus removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_corpus_removals: Option<bool>,

    /// Restrict to My Drive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_to_my_drive: Option<bool>,
}

impl ListFilesParams {
    /// Creates parameters with a query string.
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    /// Sets the space to search.
    pub fn space(mut self, space: QuerySpace) -> Self {
        self.spaces = Some(space.as_str().to_string());
        self
    }

    /// Sets the corpora.
    pub fn corpora(mut self, corpora: Corpora) -> Self {
        self.corpora = Some(corpora.as_str().to_string());
        self
    }

    /// Sets the sort order.
    pub fn order_by(mut self, keys: &[(SortBy, bool)]) -> Self {
        self.order_by = Some(SortBy::order_by(keys));
        self
    }

    /// Sets the page size.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// Parameters for fetching a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct GetFileParams {
    /// File ID.
    pub file_id: String,
    /// Acknowledge the risk of downloading flagged content (media only).
    pub acknowledge_abuse: Option<bool>,
    /// Whether the caller supports team drives.
    pub supports_team_drives: Option<bool>,
    /// Set to `Media` to download content.
    pub alt: Option<ResponseAlt>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl GetFileParams {
    /// Creates parameters for a file ID.
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            acknowledge_abuse: None,
            supports_team_drives: None,
            alt: None,
            timeout: None,
        }
    }

    /// Query pairs other than the file ID.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(alt) = self.alt {
            pairs.push(("alt", alt.as_str().to_string()));
        }
        if let Some(ack) = self.acknowledge_abuse {
            pairs.push(("acknowledgeAbuse", ack.to_string()));
        }
        if let Some(supports) = self.supports_team_drives {
            pairs.push(("supportsTeamDrives", supports.to_string()));
        }
        pairs
    }
}
