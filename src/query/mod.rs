//! Keyed query cache with stale-time and in-flight deduplication.
//!
//! Each key holds either a finished value with its fetch time or a shared
//! in-flight future. Concurrent `get`s for the same key await the same
//! future, so one request serves all of them. Errors are never cached, and
//! finished entries older than the caller's stale time are swept on `get`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, trace};

use crate::resource::FetchError;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

enum Entry<T: Clone> {
    InFlight { id: u64, future: SharedFetch<T> },
    Ready { value: T, fetched_at: Instant },
}

struct Inner<K, T: Clone> {
    entries: HashMap<K, Entry<T>>,
    next_id: u64,
}

pub struct QueryCache<K, T: Clone> {
    inner: Arc<Mutex<Inner<K, T>>>,
}

impl<K, T: Clone> Clone for QueryCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T> Default for QueryCache<K, T>
where
    K: Eq + Hash + Clone + Send + std::fmt::Display + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> QueryCache<K, T>
where
    K: Eq + Hash + Clone + Send + std::fmt::Display + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Return the cached value when it is younger than `stale_time`, join a
    /// request already in flight for `key`, or start a new one with `fetch`.
    pub async fn get<F, Fut>(&self, key: &K, stale_time: Duration, fetch: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let future = {
            let mut inner = self.lock();
            evict_stale(&mut inner.entries, stale_time);
            let joined = match inner.entries.get(key) {
                Some(Entry::Ready { value, fetched_at }) if fetched_at.elapsed() < stale_time => {
                    trace!(key = %key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Entry::InFlight { future, .. }) => {
                    debug!(key = %key, "joining in-flight request");
                    Some(future.clone())
                }
                _ => None,
            };
            match joined {
                Some(future) => future,
                None => self.start(&mut inner, key, fetch()),
            }
        };
        future.await
    }

    /// Fetch `key` again regardless of staleness. A request already in
    /// flight is superseded: it still completes for its waiters but no longer
    /// writes to the cache.
    pub async fn refetch<F, Fut>(&self, key: &K, fetch: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let future = {
            let mut inner = self.lock();
            debug!(key = %key, "forced refetch");
            self.start(&mut inner, key, fetch())
        };
        future.await
    }

    /// Cached value for `key`, fresh or stale.
    #[cfg(test)]
    fn peek(&self, key: &K) -> Option<T> {
        match self.lock().entries.get(key) {
            Some(Entry::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn start<Fut>(&self, inner: &mut Inner<K, T>, key: &K, fetch: Fut) -> SharedFetch<T>
    where
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        inner.next_id += 1;
        let id = inner.next_id;
        let cache = self.clone();
        let owned_key = key.clone();
        let future = async move {
            let result = fetch.await;
            cache.settle(&owned_key, id, &result);
            result
        }
        .boxed()
        .shared();
        inner.entries.insert(
            key.clone(),
            Entry::InFlight {
                id,
                future: future.clone(),
            },
        );
        future
    }

    /// Record the outcome of request `id`, unless a newer request for the
    /// same key has replaced it.
    fn settle(&self, key: &K, id: u64, result: &Result<T, FetchError>) {
        let mut inner = self.lock();
        let current = matches!(inner.entries.get(key), Some(Entry::InFlight { id: live, .. }) if *live == id);
        if !current {
            trace!(key = %key, id, "dropping superseded result");
            return;
        }
        match result {
            Ok(value) => {
                inner.entries.insert(
                    key.clone(),
                    Entry::Ready {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                inner.entries.remove(key);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, T>> {
        // A panic while holding the lock leaves the map itself consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drop finished entries at least `stale_time` old. In-flight entries stay.
fn evict_stale<K, T: Clone>(entries: &mut HashMap<K, Entry<T>>, stale_time: Duration) {
    entries.retain(|_, entry| match entry {
        Entry::Ready { fetched_at, .. } => fetched_at.elapsed() < stale_time,
        Entry::InFlight { .. } => true,
    });
}
