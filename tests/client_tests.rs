//! Integration tests for the Drive client against mock collaborators.

use integrations_drive_reader::errors::{DriveError, ResponseError, TransportError};
use integrations_drive_reader::mocks::{drive_file, MockAuthProvider, MockDriveApi};
use integrations_drive_reader::types::{ApiResponse, FileListData, QuerySpace, ResponseAlt};
use integrations_drive_reader::{
    AuthConfig, ClientConfig, DriveClient, DriveEvent, EventType, GetFileParams, ListFilesParams,
    Token,
};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn config(use_cache: bool, token: Option<Token>) -> ClientConfig {
    let mut auth = AuthConfig::new("client-id", "secret", "https://example.com/cb");
    if let Some(token) = token {
        auth = auth.with_token(token);
    }
    ClientConfig::builder()
        .folder_id("folder-1")
        .auth(auth)
        .use_cache(use_cache)
        .build()
        .unwrap()
}

fn client_with(
    config: ClientConfig,
    auth: Arc<MockAuthProvider>,
    drive: Arc<MockDriveApi>,
) -> DriveClient {
    DriveClient::builder()
        .config(config)
        .auth_provider_arc(auth)
        .drive_api(drive)
        .build()
        .unwrap()
}

fn drain(events: &mut broadcast::Receiver<DriveEvent>) -> Vec<DriveEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn count(events: &[DriveEvent], kind: EventType) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

#[test]
fn test_cache_allocated_with_configured_size() {
    let config = ClientConfig::builder()
        .folder_id("folder-1")
        .auth(AuthConfig::new("client-id", "secret", "cb"))
        .cache_size(4096)
        .build()
        .unwrap();

    let client = DriveClient::new(config).unwrap();

    assert_eq!(client.cache().map(|c| c.max_bytes()), Some(4096));
}

#[test]
fn test_no_cache_when_disabled() {
    let client = DriveClient::new(config(false, None)).unwrap();
    assert!(client.cache().is_none());
}

#[test]
fn test_configured_token_installed_without_network() {
    // Arrange
    let auth = Arc::new(MockAuthProvider::new());
    let token = Token::new("access-1", "refresh-1");

    // Act
    let client = client_with(
        config(true, Some(token.clone())),
        auth.clone(),
        Arc::new(MockDriveApi::new()),
    );

    // Assert
    assert_eq!(auth.installed_tokens(), vec![token.clone()]);
    assert_eq!(auth.metadata_calls(), 0);
    assert_eq!(client.token(), Some(&token));
}

#[test]
fn test_no_token_means_nothing_installed() {
    let auth = Arc::new(MockAuthProvider::new());
    let client = client_with(config(true, None), auth.clone(), Arc::new(MockDriveApi::new()));

    assert!(auth.installed_tokens().is_empty());
    assert!(client.token().is_none());
}

#[test]
fn test_authorization_url_requests_offline_consent() {
    let auth = Arc::new(MockAuthProvider::new());
    let client = client_with(config(true, None), auth.clone(), Arc::new(MockDriveApi::new()));

    let first = client.authorization_url();
    let second = client.authorization_url();

    assert_eq!(first, second);
    assert!(first.contains("access_type=offline"));
    assert!(first.contains("prompt=consent"));
    assert!(first.contains("https://www.googleapis.com/auth/drive.readonly"));
    assert!(first.contains("https://www.googleapis.com/auth/drive.metadata.readonly"));
    assert_eq!(auth.metadata_calls(), 0);
}

#[test]
fn test_default_authorization_url_is_google() {
    let client = DriveClient::new(config(true, None)).unwrap();

    let url = client.authorization_url();

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=client-id"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains("prompt=consent"));
}

#[tokio::test]
async fn test_ensure_access_emits_refreshed() {
    let client = client_with(
        config(true, None),
        Arc::new(MockAuthProvider::new()),
        Arc::new(MockDriveApi::new()),
    );
    let mut events = client.subscribe();

    client.ensure_access().await.unwrap();

    let events = drain(&mut events);
    assert_eq!(events, vec![DriveEvent::new(EventType::RefreshedAccessToken)]);
}

#[tokio::test]
async fn test_refresh_failure_propagates_and_emits_error() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    let client = client_with(
        config(true, None),
        Arc::new(MockAuthProvider::failing("invalid_grant")),
        drive.clone(),
    );
    let mut events = client.subscribe();

    // Act
    let result = client.read_file_by_name("report.csv").await;

    // Assert
    let err = result.unwrap_err();
    assert!(err.is_authentication());
    assert!(err.to_string().contains("invalid_grant"));
    assert_eq!(
        drain(&mut events),
        vec![DriveEvent::new(EventType::RefreshTokenError)]
    );
    assert!(drive.list_requests().is_empty());
}

#[tokio::test]
async fn test_read_file_by_name_success() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![drive_file("F1", "report.csv")]);
    drive.enqueue_content("a,b,c");
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive.clone());
    let mut events = client.subscribe();

    // Act
    let text = client.read_file_by_name("report.csv").await.unwrap();

    // Assert
    assert_eq!(text, "a,b,c");

    let events = drain(&mut events);
    assert_eq!(count(&events, EventType::RefreshedAccessToken), 4);
    assert_eq!(count(&events, EventType::FoundFile), 1);
    assert_eq!(count(&events, EventType::FileNotFound), 0);
    let found = events
        .iter()
        .find(|e| e.kind == EventType::FoundFile)
        .unwrap();
    assert_eq!(found.file_name, None);

    let list = drive.list_requests();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].q, "name = 'report.csv' and 'folder-1' in parents");
    assert_eq!(list[0].spaces.as_deref(), Some(QuerySpace::Drive.as_str()));

    let get = drive.get_requests();
    assert_eq!(get.len(), 1);
    assert_eq!(get[0].file_id, "F1");
    assert_eq!(get[0].alt, Some(ResponseAlt::Media));
    assert_eq!(get[0].timeout, Some(Duration::from_millis(10_000)));
}

#[tokio::test]
async fn test_read_file_by_name_takes_first_match() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![
        drive_file("F1", "dup.txt"),
        drive_file("F2", "dup.txt"),
    ]);
    drive.enqueue_content("first");
    let client = client_with(config(false, None), Arc::new(MockAuthProvider::new()), drive.clone());

    let text = client.read_file_by_name("dup.txt").await.unwrap();

    assert_eq!(text, "first");
    assert_eq!(drive.get_requests()[0].file_id, "F1");
}

#[tokio::test]
async fn test_read_file_by_name_not_found() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(Vec::new());
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive.clone());
    let mut events = client.subscribe();

    // Act
    let err = client.read_file_by_name("report.csv").await.unwrap_err();

    // Assert
    assert!(matches!(err, DriveError::Resource(_)));
    assert!(err.to_string().contains("report.csv"));
    assert!(drive.get_requests().is_empty());
    assert_eq!(count(&drain(&mut events), EventType::FileNotFound), 0);
}

#[tokio::test]
async fn test_read_file_by_name_follows_renamed_file() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![drive_file("F1", "report.csv")]);
    drive.enqueue_content("old");
    drive.enqueue_files(vec![drive_file("F2", "report.csv")]);
    drive.enqueue_content("new");
    let config = ClientConfig::builder()
        .folder_id("folder-1")
        .auth(AuthConfig::new("client-id", "secret", "cb"))
        .build()
        .unwrap();
    let client = client_with(config, Arc::new(MockAuthProvider::new()), drive.clone());
    let mut events = client.subscribe();

    // Act
    let first = client.read_file_by_name("report.csv").await.unwrap();
    let second = client.read_file_by_name("report.csv").await.unwrap();

    // Assert
    assert_eq!(first, "old");
    assert_eq!(second, "new");
    assert_eq!(drive.list_requests().len(), 2);
    let ids: Vec<String> = drive.get_requests().into_iter().map(|p| p.file_id).collect();
    assert_eq!(ids, vec!["F1", "F2"]);
    assert_eq!(client.cache().unwrap().get("report.csv").unwrap().id, "F2");
    assert_eq!(count(&drain(&mut events), EventType::RefreshedAccessToken), 8);
}

#[tokio::test]
async fn test_not_found_clears_recorded_resolution() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![drive_file("F1", "report.csv")]);
    drive.enqueue_content("v1");
    drive.enqueue_files(Vec::new());
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive.clone());

    client.read_file_by_name("report.csv").await.unwrap();
    let err = client.read_file_by_name("report.csv").await.unwrap_err();

    assert!(matches!(err, DriveError::Resource(_)));
    assert_eq!(drive.get_requests().len(), 1);
    assert!(client.cache().unwrap().get("report.csv").is_none());
}

#[tokio::test]
async fn test_failed_download_evicts_cached_id() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![drive_file("F1", "report.csv")]);
    drive.enqueue_get_status(StatusCode::NOT_FOUND);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive.clone());

    let err = client.read_file_by_name("report.csv").await.unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
    assert!(client.cache().unwrap().is_empty());
}

#[tokio::test]
async fn test_without_cache_every_read_lists() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(vec![drive_file("F1", "a.txt")]);
    drive.enqueue_files(vec![drive_file("F1", "a.txt")]);
    drive.enqueue_content("x");
    drive.enqueue_content("y");
    let client = client_with(config(false, None), Arc::new(MockAuthProvider::new()), drive.clone());

    client.read_file_by_name("a.txt").await.unwrap();
    client.read_file_by_name("a.txt").await.unwrap();

    assert_eq!(drive.list_requests().len(), 2);
}

#[tokio::test]
async fn test_get_file_list_status_error() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_list(Ok(ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, None)));
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let err = client
        .get_file_list(&ListFilesParams::new("trashed = false"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("500"));
    assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_get_file_list_missing_files_is_error() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_list(Ok(ApiResponse::ok(FileListData::default())));
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let err = client
        .get_file_list(&ListFilesParams::new("trashed = false"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DriveError::Response(ResponseError::MissingFileList)
    ));
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn test_get_file_list_empty_is_ok() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_files(Vec::new());
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let files = client
        .get_file_list(&ListFilesParams::new("trashed = false"))
        .await
        .unwrap();

    assert!(files.is_empty());
}

#[tokio::test]
async fn test_get_file_list_transport_error_passes_through() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_list(Err(TransportError::Network("connection reset".into()).into()));
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let err = client
        .get_file_list(&ListFilesParams::new("trashed = false"))
        .await
        .unwrap_err();

    assert!(matches!(err, DriveError::Transport(_)));
}

#[tokio::test]
async fn test_get_file_content_found_file_carries_name() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_content(&b"\x00\x01binary"[..]);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);
    let mut events = client.subscribe();

    // Act
    let bytes = client
        .get_file_content(&GetFileParams::new("F9"), Some("blob.bin"))
        .await
        .unwrap();

    // Assert
    assert_eq!(&bytes[..], b"\x00\x01binary");
    let events = drain(&mut events);
    assert_eq!(
        events,
        vec![
            DriveEvent::new(EventType::RefreshedAccessToken),
            DriveEvent::with_file_name(EventType::FoundFile, Some("blob.bin".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_get_file_content_no_data() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_get_status(StatusCode::OK);
    drive.enqueue_get_status(StatusCode::OK);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let named = client
        .get_file_content(&GetFileParams::new("F1"), Some("notes.txt"))
        .await
        .unwrap_err();
    let unnamed = client
        .get_file_content(&GetFileParams::new("F1"), None)
        .await
        .unwrap_err();

    assert_eq!(named.to_string(), "No data returned for file notes.txt");
    assert_eq!(unnamed.to_string(), "No data returned for file");
}

#[tokio::test]
async fn test_read_file_by_id_status_error() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_get_status(StatusCode::FORBIDDEN);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let err = client.read_file_by_id("F1", None).await.unwrap_err();

    assert_eq!(err.to_string(), "Server returned HTTP status 403");
}

#[tokio::test]
async fn test_read_file_by_id_rejects_invalid_utf8() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_content(vec![0xff, 0xfe, 0xfd]);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let err = client.read_file_by_id("F1", None).await.unwrap_err();

    assert!(matches!(
        err,
        DriveError::Response(ResponseError::DeserializationError(_))
    ));
}

#[tokio::test]
async fn test_get_file_content_as_json() {
    let drive = Arc::new(MockDriveApi::new());
    drive.enqueue_content(r#"{"rows": 3}"#);
    let client = client_with(config(true, None), Arc::new(MockAuthProvider::new()), drive);

    let params = GetFileParams {
        alt: Some(ResponseAlt::Media),
        ..GetFileParams::new("F1")
    };
    let value: serde_json::Value = client.get_file_content_as(&params, None).await.unwrap();

    assert_eq!(value["rows"], 3);
}

#[tokio::test]
async fn test_concurrent_reads() {
    // Arrange
    let drive = Arc::new(MockDriveApi::new());
    for _ in 0..8 {
        drive.enqueue_content("same");
    }
    let client = Arc::new(client_with(
        config(true, None),
        Arc::new(MockAuthProvider::new()),
        drive.clone(),
    ));

    // Act
    let reads = (0..8).map(|i| {
        let client = client.clone();
        async move { client.read_file_by_id(&format!("F{}", i), None).await }
    });
    let results = futures::future::join_all(reads).await;

    // Assert
    assert!(results.iter().all(|r| matches!(r.as_deref(), Ok("same"))));
    assert_eq!(drive.get_requests().len(), 8);
}
