use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Liveness flag shared between a feed's owner and the work it starts.
///
/// Clones observe the same flag. Once [`MountSignal::unmount`] is called,
/// results that resolve afterwards must not be applied to feed state.
#[derive(Debug, Clone, Default)]
pub struct MountSignal {
    unmounted: Arc<AtomicBool>,
}

impl MountSignal {
    /// Create a new signal in the mounted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the feed as gone. Idempotent.
    pub fn unmount(&self) {
        self.unmounted.store(true, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted.load(Ordering::SeqCst)
    }
}
