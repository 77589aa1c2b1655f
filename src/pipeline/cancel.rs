//! Cooperative cancellation shared by the scanner, its pool, and the rename executor.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::ScanError;

/// Cloneable cancel signal.
///
/// Checked with [`CancelToken::check`] before new work, and waited on through
/// [`CancelToken::signal`] inside `select!` alongside other channels: cancelling drops the
/// only sender, so every clone's receiver becomes ready at once.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.trigger.lock().unwrap().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has fired.
    pub fn check(&self) -> Result<(), ScanError> {
        if self.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Receiver that never yields a message and disconnects on cancel. Only useful in `select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}
