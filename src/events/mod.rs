//! Lifecycle notifications emitted by the client.
//!
//! Events go out on a `tokio::sync::broadcast` channel. Emission never
//! blocks: with no subscribers the event is dropped, and a subscriber only
//! sees events sent after it subscribed.
//!
//! ```no_run
//! # use integrations_drive_reader::DriveClient;
//! # use integrations_drive_reader::events::EventType;
//! # async fn example(client: DriveClient) {
//! let mut events = client.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if event.kind == EventType::FoundFile {
//!             println!("found {:?}", event.file_name);
//!         }
//!     }
//! });
//! # }
//! ```

use tokio::sync::broadcast;

/// Default number of undelivered events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Request metadata could not be obtained.
    RefreshTokenError,
    /// Request metadata was obtained.
    RefreshedAccessToken,
    /// File content was returned.
    FoundFile,
    /// No file matched a name lookup. Not raised by the current read paths.
    FileNotFound,
}

/// Event with its optional file name payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveEvent {
    /// Event kind.
    pub kind: EventType,
    /// File name, when the triggering call supplied one.
    pub file_name: Option<String>,
}

impl DriveEvent {
    /// Creates an event without payload.
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            file_name: None,
        }
    }

    /// Creates an event with an optional file name.
    pub fn with_file_name(kind: EventType, file_name: Option<String>) -> Self {
        Self { kind, file_name }
    }
}

/// Fire-and-forget event publisher.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<DriveEvent>,
}

impl EventEmitter {
    /// Creates an emitter buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `event` to current subscribers.
    pub fn emit(&self, event: DriveEvent) {
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DriveEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
