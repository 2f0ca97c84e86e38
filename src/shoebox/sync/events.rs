//! Upload progress events.
//!
//! The synchronizer reports the start and the end of every upload attempt so a
//! presentation layer can show a spinner, a toast, or nothing at all. Reporting
//! never blocks the upload.

use tokio::sync::mpsc;
use uuid::Uuid;

/// How a started upload ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// The asset is now `Failed`; carries a human-readable reason.
    Failed(String),
    /// The asset was deleted while the upload ran; the result was dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { id: Uuid, stored_name: String },
    Finished { id: Uuid, outcome: UploadOutcome },
}

pub trait UploadNotifier: Send + Sync {
    fn notify(&self, event: UploadEvent);
}

#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl UploadNotifier for NoopNotifier {
    fn notify(&self, _event: UploadEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<UploadEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UploadEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl UploadNotifier for ChannelNotifier {
    fn notify(&self, event: UploadEvent) {
        // A dropped receiver just means nobody is watching.
        let _ = self.sender.send(event);
    }
}
