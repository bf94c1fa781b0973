//! Memoization and request coalescing for dependency resolution.
//!
//! The cache maps a normalized module path to the outcome of resolving it
//! (the dependency set, the parent/include-only skip sentinel, or the
//! error). Entries are written once and never evicted; the cache lives
//! exactly as long as one orchestration run and is passed by reference
//! into every resolver call.
//!
//! Coalescing uses a per-key state machine over a [`DashMap`]:
//!
//! - no entry: the caller claims ownership by inserting `Pending` and
//!   computes the result itself
//! - `Pending(notify)`: another task is computing; the caller registers
//!   on the notify handle *before* releasing the map entry (so a wakeup
//!   between release and await cannot be missed), waits, and re-checks
//! - `Done(result)`: the memoized result is cloned out
//!
//! This guarantees at-most-one publication per key even under concurrent
//! callers; every waiter observes the exact result the owner produced.
//! [`DependencyCache::try_claim`] is the non-parking variant for callers
//! that themselves own `Pending` entries (cascading resolutions): they
//! get [`Claim::Busy`] for another task's in-flight entry and recompute
//! locally instead of risking a loop of owners waiting on each other.

use std::pin::pin;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Notify;

use crate::core::PipegenError;

/// A resolved dependency set, or `None` for the parent/include-only
/// sentinel ("skip this module, but keep it as a dependency target").
pub type Resolution = Option<Vec<String>>;

/// What the cache stores per module path. The error side is `Clone` so a
/// memoized failure can be handed to any number of coalesced callers.
pub type CachedResolution = Result<Resolution, PipegenError>;

enum ResolutionState {
    /// One task owns the computation; waiters park on the handle.
    Pending(Arc<Notify>),
    /// The computation finished; the result is final for this run.
    Done(CachedResolution),
}

/// Outcome of [`DependencyCache::claim`] / [`DependencyCache::try_claim`].
pub enum Claim<'a> {
    /// The key was already computed; here is the memoized result.
    Cached(CachedResolution),
    /// The caller owns the computation and must call
    /// [`ComputeGuard::complete`] with the result.
    Owner(ComputeGuard<'a>),
    /// Another task owns the computation and the caller chose not to
    /// wait ([`DependencyCache::try_claim`] only).
    Busy,
}

/// Ownership token for an in-flight computation.
///
/// Dropping the guard without completing it (a panic on the owning task)
/// removes the `Pending` entry and wakes all waiters so one of them can
/// claim ownership instead of parking forever.
pub struct ComputeGuard<'a> {
    cache: &'a DependencyCache,
    key: String,
    notify: Arc<Notify>,
    completed: bool,
}

impl ComputeGuard<'_> {
    /// Publish the computation result and wake every waiter.
    pub fn complete(mut self, result: CachedResolution) {
        self.completed = true;
        self.cache.entries.insert(self.key.clone(), ResolutionState::Done(result));
        self.notify.notify_waiters();
    }
}

impl Drop for ComputeGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.cache.entries.remove(&self.key);
            self.notify.notify_waiters();
        }
    }
}

/// Shared, run-scoped memoization of dependency resolutions.
#[derive(Default)]
pub struct DependencyCache {
    entries: DashMap<String, ResolutionState>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a claim for `key`: either the memoized result or ownership
    /// of the computation.
    pub async fn claim(&self, key: &str) -> Claim<'_> {
        loop {
            match self.entries.entry(key.to_string()) {
                Entry::Occupied(entry) => match entry.get() {
                    ResolutionState::Done(result) => return Claim::Cached(result.clone()),
                    ResolutionState::Pending(notify) => {
                        let notify = Arc::clone(notify);
                        // Register interest while still holding the entry,
                        // otherwise a completion landing between release
                        // and await would be missed.
                        let mut notified = pin!(notify.notified());
                        notified.as_mut().enable();
                        drop(entry);
                        notified.await;
                    }
                },
                Entry::Vacant(entry) => {
                    let notify = Arc::new(Notify::new());
                    entry.insert(ResolutionState::Pending(Arc::clone(&notify)));
                    return Claim::Owner(ComputeGuard {
                        cache: self,
                        key: key.to_string(),
                        notify,
                        completed: false,
                    });
                }
            }
        }
    }

    /// Resolve a claim for `key` without ever parking: when another task
    /// owns the computation, returns [`Claim::Busy`] instead of waiting.
    ///
    /// A cascading resolution already holds `Pending` entries of its own
    /// while it claims children; waiting here could close a loop of
    /// owners parked on each other's entries. Such callers take `Busy`
    /// and recompute on their own stack, leaving the owner to publish
    /// the memoized copy.
    pub fn try_claim(&self, key: &str) -> Claim<'_> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                ResolutionState::Done(result) => Claim::Cached(result.clone()),
                ResolutionState::Pending(_) => Claim::Busy,
            },
            Entry::Vacant(entry) => {
                let notify = Arc::new(Notify::new());
                entry.insert(ResolutionState::Pending(Arc::clone(&notify)));
                Claim::Owner(ComputeGuard {
                    cache: self,
                    key: key.to_string(),
                    notify,
                    completed: false,
                })
            }
        }
    }

    /// Pre-mark `key` as a parent/include-only module.
    ///
    /// Used for include targets discovered while resolving a child: they
    /// must never produce a project of their own. An existing entry (of
    /// any state) is left alone.
    pub fn insert_skip_sentinel(&self, key: &str) {
        if let Entry::Vacant(entry) = self.entries.entry(key.to_string()) {
            entry.insert(ResolutionState::Done(Ok(None)));
        }
    }

    /// Number of finished or in-flight entries (test observability).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
