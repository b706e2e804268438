// libs/shared/database/src/locks.rs
//
// Per-key async locks used to serialise read-validate-write sequences
// (one key per doctor and calendar date).

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("Timed out after {0:?} waiting for scheduling lock")]
    Timeout(Duration),
}

/// Held while a key is locked. Dropping it releases the key.
#[derive(Debug)]
pub struct SlotGuard {
    _guard: OwnedMutexGuard<()>,
}

pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Waits for exclusive ownership of `key`, giving up after the configured timeout.
    pub async fn acquire(&self, key: K) -> Result<SlotGuard, LockError> {
        let lock = self.entry(key.clone());

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Acquired scheduling lock {:?}", key);
                Ok(SlotGuard { _guard: guard })
            }
            Err(_) => {
                warn!("Scheduling lock contention on {:?}: gave up after {:?}", key, self.timeout);
                Err(LockError::Timeout(self.timeout))
            }
        }
    }

    /// Number of keys currently tracked (held or recently used).
    pub fn tracked_keys(&self) -> usize {
        match self.locks.lock() {
            Ok(map) => map.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn entry(&self, key: K) -> Arc<AsyncMutex<()>> {
        let mut map = match self.locks.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop entries nobody holds or waits on.
        map.retain(|_, lock| Arc::strong_count(lock) > 1);

        map.entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
