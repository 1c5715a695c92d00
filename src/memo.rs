//! Request memoization.
//!
//! A [`Memo`] keeps one shared future per key. Every caller asking for the same
//! key awaits that future, so a lookup is issued at most once no matter how many
//! callers race for it, and its outcome is replayed to later callers.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    hash::Hash,
    sync::{Mutex, PoisonError},
};
use tracing::trace;

/// What to do with a lookup that settled with an error.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum FailurePolicy {
    /// Replay the failure for the rest of the session.
    #[default]
    Cache,
    /// Forget the failure once it settles; the next call fetches again.
    Retry,
}

type Pending<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Memoizes asynchronous lookups keyed by `K`.
///
/// Keys are compared structurally through their `Hash` and `Eq` impls, so the
/// key type a caller picks decides which calls are considered identical.
pub struct Memo<K, V, E> {
    entries: Mutex<HashMap<K, Pending<V, E>>>,
    policy: FailurePolicy,
}

impl<K, V, E> Memo<K, V, E>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            entries: Mutex::default(),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns the memoized outcome for `key`, calling `fetch` only when no
    /// usable entry exists.
    ///
    /// `fetch` runs when the shared future is first polled, after the entry
    /// table is unlocked.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        K: Send + 'static,
        F: FnOnce(K) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let pending = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                Some(pending) if !self.is_evictable(pending) => {
                    trace!(?key, "memo hit");
                    pending.clone()
                }
                _ => {
                    trace!(?key, "memo miss");
                    let fetch_key = key.clone();
                    let pending = async move { fetch(fetch_key).await }.boxed().shared();
                    entries.insert(key, pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn is_evictable(&self, pending: &Pending<V, E>) -> bool {
        match self.policy {
            FailurePolicy::Cache => false,
            FailurePolicy::Retry => matches!(pending.peek(), Some(Err(_))),
        }
    }

    /// Drops the entry for `key`, returns whether there was one.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, E> fmt::Debug for Memo<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.entries.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("Memo").field("policy", &self.policy).field("len", &len).finish()
    }
}
