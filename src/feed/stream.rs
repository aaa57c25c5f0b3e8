//! Price tap stream handle.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::{FeedError, FeedResult};
use crate::price::PriceUpdate;

/// A bounded stream of every [`PriceUpdate`] the feed emits.
///
/// Taps are lossy by design: if a consumer falls behind, updates for it are
/// dropped rather than stalling the tick worker. Dropping the stream
/// detaches it; the worker prunes disconnected taps on the next emit.
#[derive(Debug)]
pub struct PriceStream {
    rx: Receiver<PriceUpdate>,
}

impl PriceStream {
    pub(crate) fn new(rx: Receiver<PriceUpdate>) -> Self {
        Self { rx }
    }

    /// Receive the next update (blocking).
    ///
    /// # Errors
    /// [`FeedError::Disconnected`] once the feed has shut down and the
    /// buffer is drained.
    pub fn recv(&self) -> FeedResult<PriceUpdate> {
        self.rx.recv().map_err(|_| FeedError::Disconnected {
            path: "price_stream".to_string(),
        })
    }

    /// Receive the next update with a timeout.
    ///
    /// # Errors
    /// [`FeedError::Timeout`] if no update arrives in time,
    /// [`FeedError::Disconnected`] once the feed has shut down.
    pub fn recv_timeout(&self, timeout: Duration) -> FeedResult<PriceUpdate> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => FeedError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => FeedError::Disconnected {
                path: "price_stream".to_string(),
            },
        })
    }

    /// Take an update if one is already buffered.
    #[must_use]
    pub fn try_recv(&self) -> Option<PriceUpdate> {
        self.rx.try_recv().ok()
    }
}
