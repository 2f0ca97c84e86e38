use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Where an asset stands in its journey to the remote endpoint.
///
/// ```text
/// Pending  --start upload-->       InFlight
/// InFlight --transport success-->  Uploaded   (terminal)
/// InFlight --transport failure-->  Failed
/// Failed   --manual retry-->       InFlight
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadState {
    Pending,
    InFlight,
    Uploaded,
    Failed,
}

impl UploadState {
    /// Whether an upload may be started from this state.
    pub fn is_startable(self) -> bool {
        matches!(self, UploadState::Pending | UploadState::Failed)
    }

    pub fn can_transition_to(self, next: UploadState) -> bool {
        use UploadState::*;
        matches!(
            (self, next),
            (Pending, InFlight) | (InFlight, Uploaded) | (InFlight, Failed) | (Failed, InFlight)
        )
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadState::Pending => "pending",
            UploadState::InFlight => "uploading",
            UploadState::Uploaded => "uploaded",
            UploadState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    /// Filename inside the local file store. Never changes after creation.
    pub stored_name: String,
    /// Consumer-facing reference to the binary. Recomputed on load, never persisted.
    #[serde(skip)]
    pub display_path: String,
    pub upload_state: UploadState,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(stored_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            stored_name,
            display_path: String::new(),
            upload_state: UploadState::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UploadState::*;

    const ALL: [UploadState; 4] = [Pending, InFlight, Uploaded, Failed];

    #[test]
    fn only_pending_and_failed_are_startable() {
        assert!(Pending.is_startable());
        assert!(Failed.is_startable());
        assert!(!InFlight.is_startable());
        assert!(!Uploaded.is_startable());
    }

    #[test]
    fn pending_never_jumps_to_uploaded() {
        assert!(!Pending.can_transition_to(Uploaded));
        assert!(!Pending.can_transition_to(Failed));
        assert!(Pending.can_transition_to(InFlight));
    }

    #[test]
    fn uploaded_is_terminal() {
        for next in ALL {
            assert!(!Uploaded.can_transition_to(next), "Uploaded -> {}", next);
        }
    }

    #[test]
    fn in_flight_resolves_either_way() {
        assert!(InFlight.can_transition_to(Uploaded));
        assert!(InFlight.can_transition_to(Failed));
        assert!(!InFlight.can_transition_to(Pending));
        assert!(!InFlight.can_transition_to(InFlight));
    }

    #[test]
    fn display_path_is_not_serialized() {
        let mut asset = Asset::new("photo-1-0.jpg".to_string());
        asset.display_path = "file:///somewhere/photo-1-0.jpg".to_string();

        let json = serde_json::to_string(&asset).unwrap();
        assert!(!json.contains("display_path"));

        let parsed: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.display_path, "");
        assert_eq!(parsed.upload_state, Pending);
    }
}
