use crate::errors::{EbookError, EbookResult};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cloneable cancellation signal shared between a worker and its caller.
///
/// Once cancelled, a token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// # Errors
    /// [`EbookError::Aborted`] if the token has been cancelled.
    pub fn check_cancelled(&self) -> EbookResult<()> {
        if self.is_cancelled() {
            return Err(EbookError::Aborted);
        }
        Ok(())
    }
}
