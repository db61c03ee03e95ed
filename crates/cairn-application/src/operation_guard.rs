//! Single-flight guard keyed by operation kind.
//!
//! A permit is handed out for at most one call per `OperationKind`. A second
//! call of the same kind is rejected until the first permit is dropped.

use cairn_core::OperationKind;
use cairn_core::error::{CairnError, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    in_flight: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `kind`, or fails with `OperationInProgress`.
    pub fn try_acquire(&self, kind: OperationKind) -> Result<OperationPermit> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(kind) {
            tracing::debug!("[OperationGuard] Rejecting concurrent {}", kind);
            return Err(CairnError::OperationInProgress(kind));
        }
        Ok(OperationPermit {
            kind,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, kind: OperationKind) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&kind)
    }
}

/// Releases its slot when dropped, including on early return and panic.
#[derive(Debug)]
pub struct OperationPermit {
    kind: OperationKind,
    in_flight: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationPermit {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.kind);
    }
}
