//! Debounced capture.
//!
//! One coalescing timer for the whole page, not one per element: the system
//! models "the text the user is currently composing", so if the user edits
//! element A and focuses element B before the quiet period elapses, only B
//! fires. A new qualifying event always cancels the pending callback.

use std::time::Duration;

use civil_page::ElementHandle;
use tokio::time::Instant;

/// Quiet period after the last qualifying input event before a capture
/// fires.
pub const QUIET_PERIOD: Duration = Duration::from_millis(800);

#[derive(Debug)]
struct Pending {
    element: ElementHandle,
    deadline: Instant,
}

/// Single-slot debounce timer, driven by the owning event loop.
///
/// [`record`](Self::record) arms (or re-arms) the slot,
/// [`quiet_elapsed`](Self::quiet_elapsed) resolves at the deadline, and
/// [`take`](Self::take) disarms and yields the element. The future borrows
/// only shared state, so it is safe to re-create every loop iteration.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<Pending>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(QUIET_PERIOD)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Arm the timer for `element`, cancelling any pending callback - even
    /// one armed for a different element.
    pub fn record(&mut self, element: ElementHandle) {
        self.pending = Some(Pending {
            element,
            deadline: Instant::now() + self.quiet,
        });
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves once the quiet period has elapsed; never resolves while
    /// disarmed.
    pub async fn quiet_elapsed(&self) {
        match &self.pending {
            Some(pending) => tokio::time::sleep_until(pending.deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Disarm and return the element whose capture is due.
    pub fn take(&mut self) -> Option<ElementHandle> {
        self.pending.take().map(|p| p.element)
    }
}
