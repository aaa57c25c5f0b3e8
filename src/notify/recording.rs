//! Recording notifier for tests and embedding.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{NotificationCapability, PermissionState};

/// A delivered notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// De-duplication tag the sender attached.
    pub dedup_tag: String,
}

/// Captures every delivered notification instead of displaying it.
///
/// The permission flow is scriptable: construct the capability with the
/// answer the "user" will give when asked. Useful both in tests and as a
/// buffer for hosts that render notifications themselves.
#[derive(Debug)]
pub struct RecordingNotifier {
    state: Mutex<PermissionState>,
    answer: PermissionState,
    requests: AtomicUsize,
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    /// Capability whose user grants permission when asked.
    #[must_use]
    pub fn granting() -> Self {
        Self::with_answer(PermissionState::Granted)
    }

    /// Capability whose user denies permission when asked.
    #[must_use]
    pub fn denying() -> Self {
        Self::with_answer(PermissionState::Denied)
    }

    fn with_answer(answer: PermissionState) -> Self {
        Self {
            state: Mutex::new(PermissionState::Default),
            answer,
            requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Deliveries captured so far, in delivery order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }

    /// Number of deliveries captured so far.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// How many times permission was requested.
    #[must_use]
    pub fn permission_requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl NotificationCapability for RecordingNotifier {
    fn permission_state(&self) -> PermissionState {
        *self.state.lock()
    }

    fn request_permission(&self) -> PermissionState {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock();
        if *state == PermissionState::Default {
            *state = self.answer;
        }
        *state
    }

    fn send(&self, title: &str, body: &str, dedup_tag: &str) {
        if *self.state.lock() != PermissionState::Granted {
            return;
        }
        self.sent.lock().push(SentNotification {
            title: title.to_string(),
            body: body.to_string(),
            dedup_tag: dedup_tag.to_string(),
        });
    }
}
