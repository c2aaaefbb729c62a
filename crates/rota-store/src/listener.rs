// Live-update subscriptions.
//
// The registry owns all subscription state; repositories call notify
// after a write commits and the registry fans the refreshed view out to
// whoever is watching. Delivery rides unbounded channels so a slow
// subscriber never blocks the mutating caller.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::types::StoreResult;

/// Opaque registration token returned by `listen`/`listen_all` and
/// consumed by `stop_listening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// Stream of views of one entity: `Ok(Some)` present, `Ok(None)` absent
/// or deleted. Failures ride the same channel.
pub type EntityUpdates<E> = mpsc::UnboundedReceiver<StoreResult<Option<E>>>;

/// Stream of full refreshed collection views.
pub type CollectionUpdates<E> = mpsc::UnboundedReceiver<StoreResult<Vec<E>>>;

enum Subscription<E> {
    Entity {
        id: String,
        tx: mpsc::UnboundedSender<StoreResult<Option<E>>>,
    },
    Collection {
        tx: mpsc::UnboundedSender<StoreResult<Vec<E>>>,
    },
}

struct Inner<E> {
    next_handle: u64,
    subscriptions: HashMap<u64, Subscription<E>>,
}

pub(crate) struct ListenerRegistry<E> {
    inner: Mutex<Inner<E>>,
}

impl<E: Clone> ListenerRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_handle: 0,
                subscriptions: HashMap::new(),
            }),
        }
    }

    /// Register an entity watch. The first payload (the current state, or
    /// the failure to read it) is queued before this returns, so the
    /// subscriber always sees a snapshot before any update.
    pub(crate) fn subscribe_entity(
        &self,
        id: &str,
        snapshot: StoreResult<Option<E>>,
    ) -> (ListenerHandle, EntityUpdates<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(snapshot);
        let mut inner = self.inner.lock().expect("listener registry poisoned");
        let handle = ListenerHandle(inner.next_handle);
        inner.next_handle += 1;
        inner.subscriptions.insert(
            handle.0,
            Subscription::Entity {
                id: id.to_string(),
                tx,
            },
        );
        (handle, rx)
    }

    pub(crate) fn subscribe_collection(
        &self,
        snapshot: StoreResult<Vec<E>>,
    ) -> (ListenerHandle, CollectionUpdates<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(snapshot);
        let mut inner = self.inner.lock().expect("listener registry poisoned");
        let handle = ListenerHandle(inner.next_handle);
        inner.next_handle += 1;
        inner
            .subscriptions
            .insert(handle.0, Subscription::Collection { tx });
        (handle, rx)
    }

    /// Idempotent. After removal no further payloads are queued for the
    /// handle; anything already in the channel still drains.
    pub(crate) fn unsubscribe(&self, handle: ListenerHandle) {
        let mut inner = self.inner.lock().expect("listener registry poisoned");
        inner.subscriptions.remove(&handle.0);
    }

    pub(crate) fn has_collection_listeners(&self) -> bool {
        let inner = self.inner.lock().expect("listener registry poisoned");
        inner
            .subscriptions
            .values()
            .any(|sub| matches!(sub, Subscription::Collection { .. }))
    }

    /// Push a fresh view of one entity to its watchers.
    pub(crate) fn notify_entity(&self, id: &str, value: StoreResult<Option<E>>) {
        // Snapshot the senders, then deliver without holding the lock.
        let targets: Vec<(u64, mpsc::UnboundedSender<StoreResult<Option<E>>>)> = {
            let inner = self.inner.lock().expect("listener registry poisoned");
            inner
                .subscriptions
                .iter()
                .filter_map(|(handle, sub)| match sub {
                    Subscription::Entity { id: watched, tx } if watched == id => {
                        Some((*handle, tx.clone()))
                    }
                    _ => None,
                })
                .collect()
        };
        let mut gone = Vec::new();
        for (handle, tx) in targets {
            if tx.send(clone_result(&value)).is_err() {
                gone.push(handle);
            }
        }
        self.prune(gone);
    }

    /// Push the full refreshed collection to every collection watcher.
    pub(crate) fn notify_collection(&self, values: StoreResult<Vec<E>>) {
        let targets: Vec<(u64, mpsc::UnboundedSender<StoreResult<Vec<E>>>)> = {
            let inner = self.inner.lock().expect("listener registry poisoned");
            inner
                .subscriptions
                .iter()
                .filter_map(|(handle, sub)| match sub {
                    Subscription::Collection { tx } => Some((*handle, tx.clone())),
                    _ => None,
                })
                .collect()
        };
        let mut gone = Vec::new();
        for (handle, tx) in targets {
            if tx.send(clone_result(&values)).is_err() {
                gone.push(handle);
            }
        }
        self.prune(gone);
    }

    fn prune(&self, gone: Vec<u64>) {
        if gone.is_empty() {
            return;
        }
        tracing::debug!(count = gone.len(), "dropping listeners with closed receivers");
        let mut inner = self.inner.lock().expect("listener registry poisoned");
        for handle in gone {
            inner.subscriptions.remove(&handle);
        }
    }
}

fn clone_result<T: Clone>(value: &StoreResult<T>) -> StoreResult<T> {
    match value {
        Ok(v) => Ok(v.clone()),
        Err(err) => Err(err.clone()),
    }
}
