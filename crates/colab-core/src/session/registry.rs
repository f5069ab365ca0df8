//! Connection-keyed registry of live sessions.
//!
//! Each slot carries a generation number and a once-cell. The map lock is a
//! plain `std::sync::Mutex` held only for map reads and writes, never across
//! an `.await`. Construction runs outside the lock; concurrent callers for
//! the same connection wait on the same cell, so at most one session is built
//! per generation. A result that comes back after its slot was removed or
//! replaced is discarded, which drops the handle.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::debug;

use colab_types::error::OrchestrationError;
use colab_types::session::{ConnectionId, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connection closed before the session was ready")]
    Disconnected,

    #[error(transparent)]
    Init(#[from] OrchestrationError),
}

/// Shared handle to one live session.
pub struct SessionHandle<S> {
    generation: u64,
    session: Arc<tokio::sync::Mutex<S>>,
    terminated: Arc<AtomicBool>,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            session: Arc::clone(&self.session),
            terminated: Arc::clone(&self.terminated),
        }
    }
}

impl<S> SessionHandle<S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Lock the session for one exchange. Exchanges on the same session run
    /// one after another.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, S> {
        self.session.lock().await
    }

    /// Record that the session ended with the termination phrase.
    pub fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::Release);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn state(&self) -> SessionState {
        if self.is_terminated() {
            SessionState::Terminated
        } else if self.session.try_lock().is_err() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }
}

impl<S> fmt::Debug for SessionHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("generation", &self.generation)
            .field("terminated", &self.is_terminated())
            .finish_non_exhaustive()
    }
}

struct Slot<S> {
    generation: u64,
    cell: Arc<OnceCell<SessionHandle<S>>>,
}

pub struct SessionRegistry<S> {
    slots: Mutex<HashMap<ConnectionId, Slot<S>>>,
    next_generation: AtomicU64,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `id`, building it with `init` if there is none.
    ///
    /// Fails with [`SessionError::Disconnected`] if the connection was
    /// removed while `init` ran, and with [`SessionError::Init`] if `init`
    /// failed. In both cases nothing is left in the registry for this
    /// generation.
    pub async fn get_or_create<F, Fut>(
        &self,
        id: &ConnectionId,
        init: F,
    ) -> Result<SessionHandle<S>, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, OrchestrationError>>,
    {
        let (generation, cell) = {
            let mut slots = self.lock();
            let slot = slots.entry(*id).or_insert_with(|| {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                debug!(connection = %id, generation, "Session initializing");
                Slot {
                    generation,
                    cell: Arc::new(OnceCell::new()),
                }
            });
            (slot.generation, Arc::clone(&slot.cell))
        };

        let built = cell
            .get_or_try_init(move || async move {
                let session = init().await?;
                Ok::<_, OrchestrationError>(SessionHandle {
                    generation,
                    session: Arc::new(tokio::sync::Mutex::new(session)),
                    terminated: Arc::new(AtomicBool::new(false)),
                })
            })
            .await;

        match built {
            Ok(handle) => {
                let handle = handle.clone();
                if self.is_current(id, generation) {
                    Ok(handle)
                } else {
                    debug!(connection = %id, generation, "Discarding session built for a closed connection");
                    Err(SessionError::Disconnected)
                }
            }
            Err(e) => {
                self.discard_failed(id, generation, &cell);
                Err(SessionError::Init(e))
            }
        }
    }

    /// The ready session for `id`, if any.
    pub fn get(&self, id: &ConnectionId) -> Option<SessionHandle<S>> {
        self.lock().get(id).and_then(|slot| slot.cell.get().cloned())
    }

    /// Remove the entry for `id`. In-flight work keeps its handle but can no
    /// longer be reached through the registry.
    pub fn remove(&self, id: &ConnectionId) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            debug!(connection = %id, "Session removed");
        }
        removed
    }

    /// Remove the entry for `id` only if it still belongs to `generation`.
    pub fn remove_if_current(&self, id: &ConnectionId, generation: u64) -> bool {
        let mut slots = self.lock();
        match slots.get(id) {
            Some(slot) if slot.generation == generation => {
                slots.remove(id);
                debug!(connection = %id, generation, "Session removed");
                true
            }
            _ => false,
        }
    }

    pub fn state(&self, id: &ConnectionId) -> SessionState {
        match self.lock().get(id) {
            None => SessionState::Absent,
            Some(slot) => match slot.cell.get() {
                None => SessionState::Initializing,
                Some(handle) => handle.state(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether `generation` is still the entry registered for `id`.
    pub fn is_current(&self, id: &ConnectionId, generation: u64) -> bool {
        self.lock()
            .get(id)
            .is_some_and(|slot| slot.generation == generation)
    }

    /// Drop a slot whose construction failed, unless another caller is
    /// still waiting on it and will retry.
    fn discard_failed(
        &self,
        id: &ConnectionId,
        generation: u64,
        cell: &Arc<OnceCell<SessionHandle<S>>>,
    ) {
        let mut slots = self.lock();
        let Some(slot) = slots.get(id) else {
            return;
        };
        // One reference in the map, one held here.
        let unshared = Arc::strong_count(cell) == 2;
        if slot.generation == generation && !slot.cell.initialized() && unshared {
            slots.remove(id);
            debug!(connection = %id, generation, "Session initialization failed, slot dropped");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Slot<S>>> {
        // No code path panics while holding the map lock.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Counts live instances so tests can detect leaked handles.
    struct LiveCounted {
        live: Arc<AtomicUsize>,
    }

    impl LiveCounted {
        fn new(live: &Arc<AtomicUsize>) -> Self {
            live.fetch_add(1, Ordering::SeqCst);
            Self {
                live: Arc::clone(live),
            }
        }
    }

    impl Drop for LiveCounted {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_session() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        let inits = AtomicUsize::new(0);

        let first = registry
            .get_or_create(&id, || async {
                inits.fetch_add(1, Ordering::SeqCst);
                Ok(1u32)
            })
            .await
            .unwrap();
        let second = registry
            .get_or_create(&id, || async {
                inits.fetch_add(1, Ordering::SeqCst);
                Ok(2u32)
            })
            .await
            .unwrap();

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(first.generation(), second.generation());
        assert_eq!(*second.lock().await, 1);
        assert_eq!(registry.state(&id), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        assert_eq!(registry.state(&id), SessionState::Absent);

        let handle = registry.get_or_create(&id, || async { Ok(()) }).await.unwrap();
        assert_eq!(registry.state(&id), SessionState::Idle);

        {
            let _guard = handle.lock().await;
            assert_eq!(registry.state(&id), SessionState::Active);
        }
        assert_eq!(registry.state(&id), SessionState::Idle);

        handle.mark_terminated();
        assert_eq!(registry.state(&id), SessionState::Terminated);

        assert!(registry.remove_if_current(&id, handle.generation()));
        assert_eq!(registry.state(&id), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_failed_init_leaves_no_entry() {
        let registry: SessionRegistry<()> = SessionRegistry::new();
        let id = ConnectionId::new();

        let err = registry
            .get_or_create(&id, || async {
                Err(OrchestrationError::IncompleteTeam {
                    expected: 3,
                    found: 1,
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Init(OrchestrationError::IncompleteTeam { .. })
        ));
        assert_eq!(registry.state(&id), SessionState::Absent);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_after_disconnect_starts_fresh() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        let live = Arc::new(AtomicUsize::new(0));

        let first = registry
            .get_or_create(&id, || async { Ok(LiveCounted::new(&live)) })
            .await
            .unwrap();
        let first_generation = first.generation();
        drop(first);

        assert!(registry.remove(&id));
        assert_eq!(registry.state(&id), SessionState::Absent);
        assert_eq!(live.load(Ordering::SeqCst), 0, "stale session was not dropped");

        // Same (former) connection id comes back.
        let second = registry
            .get_or_create(&id, || async { Ok(LiveCounted::new(&live)) })
            .await
            .unwrap();
        assert_ne!(second.generation(), first_generation);
        assert_eq!(live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnect_during_init_discards_result() {
        let registry = Arc::new(SessionRegistry::new());
        let id = ConnectionId::new();
        let live = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let task = {
            let registry = Arc::clone(&registry);
            let live = Arc::clone(&live);
            tokio::spawn(async move {
                registry
                    .get_or_create(&id, || async move {
                        let _ = release_rx.await;
                        Ok(LiveCounted::new(&live))
                    })
                    .await
                    .map(|_| ())
            })
        };

        while registry.state(&id) != SessionState::Initializing {
            tokio::task::yield_now().await;
        }
        assert!(registry.remove(&id));
        release_tx.send(()).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(SessionError::Disconnected)));
        assert!(registry.is_empty());
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_debug_shows_generation_and_termination() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        let handle = registry.get_or_create(&id, || async { Ok(()) }).await.unwrap();
        handle.mark_terminated();

        let rendered = format!("{handle:?}");
        assert!(rendered.starts_with("SessionHandle"));
        assert!(rendered.contains(&format!("generation: {}", handle.generation())));
        assert!(rendered.contains("terminated: true"));
    }

    #[tokio::test]
    async fn test_remove_if_current_ignores_newer_generation() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();

        let old = registry.get_or_create(&id, || async { Ok(()) }).await.unwrap();
        registry.remove(&id);
        let new = registry.get_or_create(&id, || async { Ok(()) }).await.unwrap();

        assert!(!registry.remove_if_current(&id, old.generation()));
        assert_eq!(registry.get(&id).map(|h| h.generation()), Some(new.generation()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_messages_racing_disconnect_keep_registry_consistent() {
        for _ in 0..20 {
            let registry = Arc::new(SessionRegistry::new());
            let id = ConnectionId::new();
            let live = Arc::new(AtomicUsize::new(0));

            // Hold the map lock so every contender queues up behind it.
            let guard = registry.slots.lock().unwrap();

            let mut messages = Vec::new();
            for _ in 0..3 {
                let registry = Arc::clone(&registry);
                let live = Arc::clone(&live);
                messages.push(tokio::spawn(async move {
                    registry
                        .get_or_create(&id, || async move {
                            tokio::time::sleep(Duration::from_millis(1)).await;
                            Ok(LiveCounted::new(&live))
                        })
                        .await
                        .map(|handle| handle.generation())
                }));
            }
            let disconnect = {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.remove(&id) })
            };

            std::thread::sleep(Duration::from_millis(20));
            drop(guard);

            let mut generations = Vec::new();
            for task in messages {
                match task.await.unwrap() {
                    Ok(generation) => generations.push(generation),
                    Err(SessionError::Disconnected) => {}
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            disconnect.await.unwrap();

            // At most one entry, and only handles the registry still owns
            // are alive.
            assert!(registry.len() <= 1);
            let expected_live = usize::from(registry.get(&id).is_some());
            assert_eq!(live.load(Ordering::SeqCst), expected_live);

            // Callers that succeeded all saw the same session.
            generations.sort_unstable();
            generations.dedup();
            assert!(generations.len() <= 2);
            if let Some(handle) = registry.get(&id) {
                assert!(generations.contains(&handle.generation()));
            }
        }
    }
}
