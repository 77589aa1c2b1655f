//! Bounded admission pool for directory reads.
//!
//! The pool is an arena of N permit tokens held in a bounded channel. Acquiring takes a
//! token out; dropping the [`Permit`] puts it back, so every exit path releases exactly once.

use crossbeam_channel::{Receiver, Sender, bounded, select};

use super::cancel::CancelToken;
use crate::error::ScanError;

pub struct Pool {
    capacity: usize,
    put: Sender<()>,
    take: Receiver<()>,
}

/// One admitted slot. Released on drop.
pub struct Permit<'a> {
    pool: &'a Pool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // Capacity is exactly the number of outstanding permits, so this never blocks.
        let _ = self.pool.put.try_send(());
    }
}

impl Pool {
    /// Pool with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (put, take) = bounded::<()>(capacity);
        for _ in 0..capacity {
            let _ = put.try_send(());
        }
        Self {
            capacity,
            put,
            take,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.take.len()
    }

    /// Wait for a free slot, or fail with [`ScanError::Cancelled`] if `cancel` fires first.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<Permit<'_>, ScanError> {
        cancel.check()?;
        select! {
            recv(self.take) -> slot => match slot {
                // A slot won the race with a cancel that landed meanwhile: hand it back.
                Ok(()) if cancel.is_cancelled() => {
                    drop(Permit { pool: self });
                    Err(ScanError::Cancelled)
                }
                Ok(()) => Ok(Permit { pool: self }),
                Err(_) => Err(ScanError::Cancelled),
            },
            recv(cancel.signal()) -> _ => Err(ScanError::Cancelled),
        }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        self.take.try_recv().ok().map(|()| Permit { pool: self })
    }
}
