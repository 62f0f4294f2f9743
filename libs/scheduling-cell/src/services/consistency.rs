use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Per-doctor serialization of conflict-check-then-write sequences.
///
/// Every booking, reschedule and approval for a doctor runs under that
/// doctor's lock, so two concurrent requests for the same slot cannot both
/// pass the conflict check before either writes - the single-writer-per-
/// doctor queue the scheduling invariant requires. Locks are created lazily
/// and doctors never contend with each other.
pub struct DoctorScheduleLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl DoctorScheduleLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `doctor_id`, waiting behind earlier writers.
    pub async fn acquire(&self, doctor_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(doctor_id).or_insert_with(|| Arc::new(Mutex::new(()))))
        };

        debug!("Acquiring schedule lock for doctor {}", doctor_id);
        lock.lock_owned().await
    }
}

impl Default for DoctorScheduleLocks {
    fn default() -> Self {
        Self::new()
    }
}
