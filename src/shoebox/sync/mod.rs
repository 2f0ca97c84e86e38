//! # Upload Synchronizer
//!
//! Gets every `Pending` or `Failed` asset to `Uploaded`, one attempt per asset
//! at a time.
//!
//! - [`synchronizer::Synchronizer`]: the state machine driver.
//! - [`transport`]: the [`UploadTransport`](transport::UploadTransport) seam and
//!   the reqwest-backed [`HttpTransport`](transport::HttpTransport).
//! - [`events`]: progress notifications for whoever is watching.
//!
//! Transport errors never propagate to callers. They end up as the `Failed`
//! state on the asset, which is the signal a UI turns into feedback. Retrying
//! is the caller's decision unless a [`RetryPolicy`](synchronizer::RetryPolicy)
//! with attempts is configured.

pub mod events;
pub mod synchronizer;
pub mod transport;

pub use events::{ChannelNotifier, NoopNotifier, UploadEvent, UploadNotifier, UploadOutcome};
pub use synchronizer::{RetryPolicy, StartUpload, Synchronizer, UploadHandle};
pub use transport::{HttpTransport, UploadRequest, UploadTransport};
