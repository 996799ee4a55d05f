// @awa-component: RVW-InFlight
//
//! Single-flight map of in-progress fetches.
//!
//! Concurrent callers asking for the same uncached key await one shared
//! result. Each fetch runs on its own task, so it completes and commits even
//! when every caller has gone away. The task removes its own entry when it
//! settles; a ticket keeps it from removing a newer fetch registered under
//! the same key after an invalidation. A detached fetch still answers its
//! waiters but never commits its result.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::cache::CacheValue;
use crate::error::ClientError;

pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<CacheValue, ClientError>>>;

#[derive(Default)]
pub(crate) struct InFlight {
    pending: DashMap<String, (u64, SharedFetch)>,
    next_ticket: AtomicU64,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Join the fetch already running for `key`, or register `fetch` as it.
    ///
    /// A new fetch is spawned immediately. `commit` runs once with a
    /// successful result, only if the fetch is still registered when it
    /// settles. Both are dropped unused when a fetch is already running.
    pub(crate) fn join_or_start<F, C>(self: &Arc<Self>, key: &str, fetch: F, commit: C) -> SharedFetch
    where
        F: Future<Output = Result<CacheValue, ClientError>> + Send + 'static,
        C: FnOnce(&CacheValue) + Send + 'static,
    {
        match self.pending.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.get().1.clone(),
            Entry::Vacant(entry) => {
                let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                let owner: Weak<Self> = Arc::downgrade(self);
                let owned_key = key.to_string();
                let task = tokio::spawn(async move {
                    let result = fetch.await;
                    let current = owner
                        .upgrade()
                        .is_some_and(|this| this.release(&owned_key, ticket));
                    if current && let Ok(value) = &result {
                        commit(value);
                    }
                    result
                });
                let shared = task
                    .map(|joined| joined.unwrap_or_else(|e| Err(ClientError::Task(e.to_string()))))
                    .boxed()
                    .shared();
                entry.insert((ticket, shared.clone()));
                shared
            }
        }
    }

    /// Drop the entry for `key` if it still belongs to `ticket`.
    fn release(&self, key: &str, ticket: u64) -> bool {
        self.pending
            .remove_if(key, |_, (current, _)| *current == ticket)
            .is_some()
    }

    /// Detach every running fetch whose key starts with `prefix`.
    ///
    /// Callers already waiting keep their future; new callers start fresh.
    pub(crate) fn forget_prefix(&self, prefix: &str) {
        self.pending.retain(|key, _| !key.starts_with(prefix));
    }

    pub(crate) fn clear(&self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> std::collections::HashSet<String> {
        self.pending.iter().map(|e| e.key().clone()).collect()
    }
}
