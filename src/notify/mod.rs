//! Notification delivery capability.
//!
//! Alert notifications flow through a permission-gated capability: ask once,
//! remember the grant or denial, then act. Delivery is a silent no-op
//! unless permission is granted.

mod log;
mod recording;

pub use log::LogNotifier;
pub use recording::{RecordingNotifier, SentNotification};

use serde::{Deserialize, Serialize};

/// Permission state of a notification capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Permission has not been requested yet.
    Default,
    /// The user granted permission.
    Granted,
    /// The user denied permission.
    Denied,
}

/// Sink for alert notifications.
///
/// `request_permission` may block on user interaction; it resolves to
/// `Granted` or `Denied`, and the answer is remembered for the lifetime of
/// the capability. `send` must be a silent no-op unless the current state
/// is `Granted`. The `dedup_tag` identifies the logical event; a sink that
/// de-duplicates by tag must deliver at most one notification per tag.
pub trait NotificationCapability: Send + Sync {
    /// Current permission state.
    fn permission_state(&self) -> PermissionState;

    /// Ask for permission, blocking until resolved. Once answered, returns
    /// the remembered answer without asking again.
    fn request_permission(&self) -> PermissionState;

    /// Deliver a titled message. No-op unless permission is granted.
    fn send(&self, title: &str, body: &str, dedup_tag: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_capability_object_safe(_: &dyn NotificationCapability) {}

    #[test]
    fn permission_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PermissionState::Granted).unwrap(),
            "\"granted\""
        );
    }
}
