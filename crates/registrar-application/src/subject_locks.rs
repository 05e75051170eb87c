use std::collections::HashMap;
use std::sync::Arc;

use registrar_core::transport::SubjectId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// One async mutex per user identity.
///
/// Holding the guard serializes event handling for that user while other
/// users proceed in parallel.
#[derive(Default)]
pub struct SubjectLocks {
    locks: RwLock<HashMap<SubjectId, Arc<Mutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `subject`.
    pub async fn acquire(&self, subject: SubjectId) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(&subject).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => self
                .locks
                .write()
                .await
                .entry(subject)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        };
        lock.lock_owned().await
    }

    /// Releases `guard` and forgets the lock of `subject` once nobody else
    /// holds or waits on it, so the map only holds users with events in flight.
    pub async fn release(&self, subject: SubjectId, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.locks.write().await;
        if locks
            .get(&subject)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&subject);
        }
    }

    /// Number of users with a lock entry.
    pub async fn tracked(&self) -> usize {
        self.locks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_subject_is_exclusive() {
        let locks = SubjectLocks::new();
        let guard = locks.acquire(SubjectId(1)).await;

        let blocked =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire(SubjectId(1))).await;
        assert!(blocked.is_err());

        // Other subjects are not affected
        let _other = locks.acquire(SubjectId(2)).await;

        drop(guard);
        let _again = locks.acquire(SubjectId(1)).await;
    }

    #[tokio::test]
    async fn test_release_forgets_idle_subjects() {
        let locks = Arc::new(SubjectLocks::new());
        let guard = locks.acquire(SubjectId(1)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let guard = locks.acquire(SubjectId(1)).await;
                locks.release(SubjectId(1), guard).await;
            })
        };
        // Let the waiter queue up behind the held guard
        tokio::time::sleep(Duration::from_millis(20)).await;

        locks.release(SubjectId(1), guard).await;
        assert_eq!(locks.tracked().await, 1);

        waiter.await.unwrap();
        assert_eq!(locks.tracked().await, 0);

        let guard = locks.acquire(SubjectId(2)).await;
        locks.release(SubjectId(2), guard).await;
        assert_eq!(locks.tracked().await, 0);
    }
}
