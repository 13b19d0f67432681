//! ABOUTME: Per-box fill lease map — rejects a concurrent `fill` on the same box with 409 (spec §4.L)

use std::sync::Arc;

use dashmap::DashSet;
use docbro_core::error::DocBroError;
use docbro_core::ids::BoxId;

#[derive(Clone, Default)]
pub struct FillLeaseMap {
    held: Arc<DashSet<BoxId>>,
}

impl FillLeaseMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lease for `box_id`, or `Err(Busy)` if a fill is already
    /// in progress for it. The returned guard releases the lease on drop.
    pub fn acquire(&self, box_id: BoxId) -> Result<FillLeaseGuard, DocBroError> {
        if self.held.insert(box_id) {
            Ok(FillLeaseGuard { held: self.held.clone(), box_id })
        } else {
            Err(DocBroError::Busy { resource: format!("box:{box_id}") })
        }
    }
}

pub struct FillLeaseGuard {
    held: Arc<DashSet<BoxId>>,
    box_id: BoxId,
}

impl Drop for FillLeaseGuard {
    fn drop(&mut self) {
        self.held.remove(&self.box_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_the_same_box_is_busy() {
        let leases = FillLeaseMap::new();
        let box_id = BoxId::new();
        let _first = leases.acquire(box_id).unwrap();
        let err = leases.acquire(box_id).unwrap_err();
        assert_eq!(err.code(), "busy");
    }

    #[test]
    fn releasing_the_guard_frees_the_lease() {
        let leases = FillLeaseMap::new();
        let box_id = BoxId::new();
        {
            let _guard = leases.acquire(box_id).unwrap();
        }
        assert!(leases.acquire(box_id).is_ok());
    }
}
