//! Log-backed notifier.

use parking_lot::RwLock;
use tracing::info;

use super::{NotificationCapability, PermissionState};

/// Delivers notifications through the process log.
///
/// Suitable for headless deployments: the permission prompt degrades to an
/// automatic grant on first request, and deliveries land as `info` events
/// carrying the de-duplication tag.
#[derive(Debug)]
pub struct LogNotifier {
    state: RwLock<PermissionState>,
}

impl LogNotifier {
    /// Create a notifier that has not been asked for permission yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(PermissionState::Default),
        }
    }

    /// Create a notifier with permission already granted.
    #[must_use]
    pub fn granted() -> Self {
        Self {
            state: RwLock::new(PermissionState::Granted),
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCapability for LogNotifier {
    fn permission_state(&self) -> PermissionState {
        *self.state.read()
    }

    fn request_permission(&self) -> PermissionState {
        let mut state = self.state.write();
        if *state == PermissionState::Default {
            *state = PermissionState::Granted;
        }
        *state
    }

    fn send(&self, title: &str, body: &str, dedup_tag: &str) {
        if *self.state.read() != PermissionState::Granted {
            return;
        }
        info!(tag = dedup_tag, "{title}: {body}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_grants_and_is_remembered() {
        let notifier = LogNotifier::new();
        assert_eq!(notifier.permission_state(), PermissionState::Default);

        assert_eq!(notifier.request_permission(), PermissionState::Granted);
        assert_eq!(notifier.permission_state(), PermissionState::Granted);
        assert_eq!(notifier.request_permission(), PermissionState::Granted);
    }

    #[test]
    fn granted_constructor_skips_the_prompt() {
        let notifier = LogNotifier::granted();
        assert_eq!(notifier.permission_state(), PermissionState::Granted);
    }
}
