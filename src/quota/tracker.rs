//! Byte budget shared by every proxied request.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::QuotaError;

/// Point-in-time view of the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub limit_bytes: u64,
    pub remaining_bytes: u64,
    pub consumed_bytes: u64,
    pub admitted: u64,
    pub rejected: u64,
}

/// Cumulative byte budget with an atomic consume operation.
///
/// The remaining counter only ever moves down, and only by the size of an
/// admitted response. A rejected request leaves it untouched, so one oversized
/// response cannot lock out smaller ones that still fit.
#[derive(Debug)]
pub struct QuotaTracker {
    limit_bytes: u64,
    remaining_bytes: AtomicU64,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl QuotaTracker {
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            limit_bytes,
            remaining_bytes: AtomicU64::new(limit_bytes),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Consume `bytes` from the budget if it fits, returning what is left.
    pub fn try_consume(&self, bytes: u64) -> Result<u64, QuotaError> {
        match self
            .remaining_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(bytes)
            }) {
            Ok(previous) => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
                Ok(previous - bytes)
            }
            Err(remaining) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                Err(QuotaError::Exhausted {
                    requested: bytes,
                    remaining,
                })
            }
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit_bytes
    }

    pub fn remaining(&self) -> u64 {
        self.remaining_bytes.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let remaining_bytes = self.remaining();
        QuotaSnapshot {
            limit_bytes: self.limit_bytes,
            remaining_bytes,
            consumed_bytes: self.limit_bytes - remaining_bytes,
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
