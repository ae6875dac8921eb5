//! Core resource pool implementation

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use crate::resource::{Poolable, ResourceId};

use parking_lot::{Condvar, Mutex};
use std::collections::{HashSet, VecDeque};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Internal state, guarded by one mutex so every transition across the three
/// sets is atomic.
///
/// Invariants at every unlock:
/// - `outstanding` is a subset of `members`
/// - a resource queued in `available` is never also in `outstanding`
/// - `members.len() == available.len() + outstanding.len()`
struct PoolState<T> {
    members: HashSet<ResourceId>,
    available: VecDeque<T>,
    outstanding: HashSet<ResourceId>,
    is_open: bool,
}

struct Shared<T> {
    state: Mutex<PoolState<T>>,
    // Single broadcast channel for all waiter predicates: acquire waits for
    // supply, remove waits for one specific resource, close waits for
    // outstanding to empty. Every waiter re-checks its own predicate on wake.
    returned: Condvar,
}

/// Thread-safe pool of reusable resources
///
/// The pool tracks membership and circulation of caller-owned resources: it
/// never constructs or destroys resources itself, it only hands them out and
/// takes them back. Cloning the pool yields another handle to the same shared
/// state, so one pool can be passed to any number of worker threads.
///
/// # Examples
///
/// ```
/// use respool::{Pool, PoolConfig, Poolable, ResourceId};
///
/// struct Connection {
///     id: ResourceId,
/// }
///
/// impl Poolable for Connection {
///     fn id(&self) -> ResourceId {
///         self.id
///     }
/// }
///
/// let pool = Pool::new(PoolConfig::default());
/// pool.open();
/// assert!(pool.add(Connection { id: ResourceId::new() }).is_ok());
///
/// let conn = pool.acquire().unwrap();
/// assert!(pool.release(conn).is_ok());
/// ```
pub struct Pool<T: Poolable> {
    shared: Arc<Shared<T>>,
    config: Arc<PoolConfig>,
}

impl<T: Poolable> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl<T: Poolable> Pool<T> {
    /// Create an empty pool
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    members: HashSet::new(),
                    available: VecDeque::new(),
                    outstanding: HashSet::new(),
                    is_open: config.start_open,
                }),
                returned: Condvar::new(),
            }),
            config: Arc::new(config),
        }
    }

    /// Create a pool seeded with initial resources
    ///
    /// Resources whose identifier duplicates an earlier one in the batch are
    /// dropped, same as a rejected `add`.
    pub fn with_resources(resources: Vec<T>, config: PoolConfig) -> Self {
        let pool = Self::new(config);
        {
            let mut state = pool.shared.state.lock();
            for resource in resources {
                if state.members.insert(resource.id()) {
                    state.available.push_back(resource);
                }
            }
        }
        pool
    }

    /// Open the pool for acquisitions. Idempotent.
    pub fn open(&self) {
        self.shared.state.lock().is_open = true;
    }

    /// Close the pool after draining in-flight borrows
    ///
    /// Blocks until every outstanding resource has been released or removed,
    /// then gates new acquisitions. There is no internal deadline: if a
    /// borrower never returns its resource, `close` waits forever. Callers
    /// needing a bound should apply their own and fall back to
    /// [`close_now`](Pool::close_now).
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        while !state.outstanding.is_empty() {
            self.shared.returned.wait(&mut state);
        }
        state.is_open = false;
        // Wake parked acquire waiters so they observe the closure
        self.shared.returned.notify_all();
    }

    /// Close the pool immediately, without draining
    ///
    /// Outstanding resources stay tracked as outstanding; borrowers may still
    /// `release` them, but the pool no longer hands anything out.
    pub fn close_now(&self) {
        let mut state = self.shared.state.lock();
        state.is_open = false;
        self.shared.returned.notify_all();
    }

    /// Whether the pool currently accepts acquisitions
    pub fn is_open(&self) -> bool {
        self.shared.state.lock().is_open
    }

    /// Total number of registered resources, free or borrowed
    pub fn size(&self) -> usize {
        self.shared.state.lock().members.len()
    }

    /// Number of resources currently free to borrow
    pub fn available_count(&self) -> usize {
        self.shared.state.lock().available.len()
    }

    /// Number of resources currently borrowed
    pub fn outstanding_count(&self) -> usize {
        self.shared.state.lock().outstanding.len()
    }

    /// Register a resource with the pool
    ///
    /// The pool takes ownership while the resource sits in the free queue.
    /// Returns `Err` with the resource handed back if its identifier is
    /// already a member. Never blocks.
    pub fn add(&self, resource: T) -> Result<(), T> {
        let mut state = self.shared.state.lock();
        if state.members.contains(&resource.id()) {
            return Err(resource);
        }
        state.members.insert(resource.id());
        state.available.push_back(resource);
        // New supply may satisfy a parked acquire
        self.shared.returned.notify_all();
        Ok(())
    }

    /// Retire a resource, waiting for it to come home if borrowed
    ///
    /// Returns `false` immediately if the resource is not a member. If the
    /// resource is currently borrowed, the caller blocks until that specific
    /// resource is released, then erases it and returns `true`. A concurrent
    /// [`remove_now`](Pool::remove_now) that erases the target while this
    /// caller sleeps also resolves the wait, with `false`.
    pub fn remove(&self, resource: &T) -> bool {
        let id = resource.id();
        let mut state = self.shared.state.lock();
        if !state.members.contains(&id) {
            return false;
        }
        while state.outstanding.contains(&id) {
            self.shared.returned.wait(&mut state);
            if !state.members.contains(&id) {
                return false;
            }
        }
        state.members.remove(&id);
        state.available.retain(|r| r.id() != id);
        true
    }

    /// Retire a resource unconditionally, borrowed or not
    ///
    /// If the resource is currently borrowed it is simply forgotten; the
    /// borrower keeps the value, and a later `release` of it reports
    /// not-released. Returns `false` if the resource is not a member.
    pub fn remove_now(&self, resource: &T) -> bool {
        let id = resource.id();
        let mut state = self.shared.state.lock();
        if !state.members.remove(&id) {
            return false;
        }
        state.available.retain(|r| r.id() != id);
        if state.outstanding.remove(&id) {
            // Outstanding may have emptied; close and remove waiters re-check
            self.shared.returned.notify_all();
        }
        true
    }

    /// Borrow a resource, blocking until one is free
    ///
    /// Fast-fails with [`PoolError::Unavailable`] if the pool is closed or
    /// has no members. Otherwise blocks until a resource is released or
    /// added, or until the pool is closed while waiting.
    pub fn acquire(&self) -> PoolResult<T> {
        let mut state = self.shared.state.lock();
        if !state.is_open || state.members.is_empty() {
            return Err(PoolError::Unavailable);
        }
        loop {
            if let Some(resource) = state.available.pop_front() {
                state.outstanding.insert(resource.id());
                return Ok(resource);
            }
            self.shared.returned.wait(&mut state);
            if !state.is_open {
                return Err(PoolError::Unavailable);
            }
        }
    }

    /// Borrow a resource, waiting at most `timeout`
    ///
    /// Same fast-fail entry check as [`acquire`](Pool::acquire); returns
    /// [`PoolError::Timeout`] if no resource becomes free before the deadline.
    pub fn acquire_timeout(&self, timeout: Duration) -> PoolResult<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        if !state.is_open || state.members.is_empty() {
            return Err(PoolError::Unavailable);
        }
        loop {
            if let Some(resource) = state.available.pop_front() {
                state.outstanding.insert(resource.id());
                return Ok(resource);
            }
            if Instant::now() >= deadline {
                return Err(PoolError::Timeout(timeout));
            }
            let wait = self.shared.returned.wait_until(&mut state, deadline);
            if !state.is_open {
                return Err(PoolError::Unavailable);
            }
            if wait.timed_out() && state.available.is_empty() {
                return Err(PoolError::Timeout(timeout));
            }
        }
    }

    /// Borrow a resource without blocking
    pub fn try_acquire(&self) -> Option<T> {
        let mut state = self.shared.state.lock();
        if !state.is_open || state.members.is_empty() {
            return None;
        }
        let resource = state.available.pop_front()?;
        state.outstanding.insert(resource.id());
        Some(resource)
    }

    /// Borrow a resource behind a guard that releases it on drop
    pub fn acquire_scoped(&self) -> PoolResult<PooledResource<T>> {
        let resource = self.acquire()?;
        Ok(PooledResource {
            resource: Some(resource),
            pool: self.clone(),
        })
    }

    /// Return a borrowed resource to circulation
    ///
    /// Returns `Err` handing the resource back if it is not currently
    /// outstanding: never borrowed, already released, or removed while out.
    /// On success, wakes every waiter so acquire, remove, and close callers
    /// can re-check their predicates.
    pub fn release(&self, resource: T) -> Result<(), T> {
        let mut state = self.shared.state.lock();
        if !state.outstanding.remove(&resource.id()) {
            return Err(resource);
        }
        state.available.push_back(resource);
        self.shared.returned.notify_all();
        Ok(())
    }

    /// Drop every resource and reset the pool to empty
    ///
    /// Escape hatch for test isolation; not part of the production contract.
    pub fn clear_resources(&self) {
        let mut state = self.shared.state.lock();
        state.members.clear();
        state.available.clear();
        state.outstanding.clear();
        self.shared.returned.notify_all();
    }

    /// Borrow a resource asynchronously
    ///
    /// Polls the pool without blocking the runtime, bounded by the
    /// configured operation timeout.
    pub async fn acquire_async(&self) -> PoolResult<T> {
        let timeout = self
            .config
            .operation_timeout
            .unwrap_or(Duration::from_secs(30));

        tokio::time::timeout(timeout, async {
            loop {
                {
                    let mut state = self.shared.state.lock();
                    if !state.is_open || state.members.is_empty() {
                        return Err(PoolError::Unavailable);
                    }
                    if let Some(resource) = state.available.pop_front() {
                        state.outstanding.insert(resource.id());
                        return Ok(resource);
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .map_err(|_| PoolError::Timeout(timeout))?
    }

    /// Try to borrow a resource asynchronously
    pub async fn try_acquire_async(&self) -> Option<T> {
        self.acquire_async().await.ok()
    }
}

impl<T: Poolable + Send + 'static> Pool<T> {
    /// Drain and close the pool without blocking the async runtime
    ///
    /// Runs [`close`](Pool::close) on a blocking thread. Surfaces
    /// [`PoolError::Cancelled`] if that thread is torn down before the drain
    /// completes.
    pub async fn close_async(&self) -> PoolResult<()> {
        let pool = self.clone();
        tokio::task::spawn_blocking(move || pool.close())
            .await
            .map_err(|_| PoolError::Cancelled)
    }
}

/// A borrowed resource that returns itself to the pool when dropped
pub struct PooledResource<T: Poolable> {
    resource: Option<T>,
    pool: Pool<T>,
}

impl<T: Poolable> PooledResource<T> {
    /// Take the inner resource without returning it to the pool
    ///
    /// The resource stays outstanding; retire it with
    /// [`Pool::remove_now`] if it will never be released.
    pub fn into_inner(mut self) -> T {
        self.resource.take().expect("resource already taken")
    }
}

impl<T: Poolable> Deref for PooledResource<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().expect("resource already taken")
    }
}

impl<T: Poolable> DerefMut for PooledResource<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().expect("resource already taken")
    }
}

impl<T: Poolable> Drop for PooledResource<T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            let _ = self.pool.release(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Handle {
        id: ResourceId,
    }

    impl Handle {
        fn new() -> Self {
            Self {
                id: ResourceId::new(),
            }
        }

        fn with_id(id: ResourceId) -> Self {
            Self { id }
        }
    }

    impl Poolable for Handle {
        fn id(&self) -> ResourceId {
            self.id
        }
    }

    fn open_pool() -> Pool<Handle> {
        let pool = Pool::new(PoolConfig::default());
        pool.open();
        pool
    }

    #[test]
    fn add_registers_once_per_identifier() {
        let pool = open_pool();
        let id = ResourceId::new();

        assert!(pool.add(Handle::with_id(id)).is_ok());
        assert_eq!(pool.size(), 1);

        let rejected = pool.add(Handle::with_id(id));
        assert!(rejected.is_err());
        assert_eq!(pool.size(), 1);

        assert!(pool.add(Handle::new()).is_ok());
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn closed_pool_fast_fails_acquire() {
        let pool: Pool<Handle> = Pool::new(PoolConfig::default());
        assert!(pool.add(Handle::new()).is_ok());

        // Never opened
        assert_eq!(pool.acquire(), Err(PoolError::Unavailable));

        pool.open();
        pool.close_now();
        assert_eq!(pool.acquire(), Err(PoolError::Unavailable));
        assert_eq!(
            pool.acquire_timeout(Duration::from_millis(50)),
            Err(PoolError::Unavailable)
        );
    }

    #[test]
    fn empty_pool_fast_fails_acquire() {
        let pool: Pool<Handle> = open_pool();
        assert_eq!(pool.acquire(), Err(PoolError::Unavailable));
    }

    #[test]
    fn round_trip_is_lossless() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());

        let resource = pool.acquire().unwrap();
        assert_eq!(resource.id(), id);
        assert_eq!(pool.outstanding_count(), 1);

        assert!(pool.release(resource).is_ok());
        assert_eq!(pool.outstanding_count(), 0);

        let again = pool.acquire().unwrap();
        assert_eq!(again.id(), id);
    }

    #[test]
    fn available_queue_is_fifo() {
        let pool = open_pool();
        let first = ResourceId::new();
        let second = ResourceId::new();
        assert!(pool.add(Handle::with_id(first)).is_ok());
        assert!(pool.add(Handle::with_id(second)).is_ok());

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(a.id(), first);
        assert_eq!(b.id(), second);

        // Hand-out order follows return order, not creation order
        assert!(pool.release(b).is_ok());
        assert!(pool.release(a).is_ok());
        assert_eq!(pool.acquire().unwrap().id(), second);
    }

    #[test]
    fn remove_of_unknown_resource_is_not_managed() {
        let pool = open_pool();
        assert!(!pool.remove(&Handle::new()));
        assert!(!pool.remove_now(&Handle::new()));
    }

    #[test]
    fn remove_waits_for_borrowed_resource() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());
        let resource = pool.acquire().unwrap();

        let remover = {
            let pool = pool.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let removed = pool.remove(&Handle::with_id(id));
                (removed, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(200));
        assert!(pool.release(resource).is_ok());

        let (removed, waited) = remover.join().unwrap();
        assert!(removed);
        assert!(waited >= Duration::from_millis(150));
        assert_eq!(pool.size(), 0);

        // Fully erased: the identifier can be registered again
        assert!(pool.add(Handle::with_id(id)).is_ok());
    }

    #[test]
    fn remove_now_forgets_borrowed_resource() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        let resource = pool.acquire().unwrap();

        assert!(pool.remove_now(&resource));
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.outstanding_count(), 0);

        // The borrow was forgotten, so its return is rejected
        assert!(pool.release(resource).is_err());
        assert_eq!(pool.available_count(), 0);
    }

    #[test]
    fn close_drains_outstanding_borrows() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        let resource = pool.acquire().unwrap();

        let closer = {
            let pool = pool.clone();
            thread::spawn(move || {
                pool.close();
                pool.is_open()
            })
        };

        thread::sleep(Duration::from_millis(200));
        assert!(pool.is_open());
        assert!(pool.release(resource).is_ok());

        assert!(!closer.join().unwrap());
        assert!(!pool.is_open());
    }

    #[test]
    fn close_now_does_not_drain() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        let resource = pool.acquire().unwrap();

        pool.close_now();
        assert!(!pool.is_open());
        assert_eq!(pool.outstanding_count(), 1);

        // A late release is still accepted
        assert!(pool.release(resource).is_ok());
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn timed_acquire_gets_resource_released_before_deadline() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());

        let holder = {
            let pool = pool.clone();
            thread::spawn(move || {
                let resource = pool.acquire().unwrap();
                thread::sleep(Duration::from_millis(600));
                assert!(pool.release(resource).is_ok());
            })
        };

        thread::sleep(Duration::from_millis(150));
        let resource = pool.acquire_timeout(Duration::from_millis(1000)).unwrap();
        assert_eq!(resource.id(), id);
        holder.join().unwrap();
    }

    #[test]
    fn timed_acquire_times_out_when_resource_stays_out() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());

        let holder = {
            let pool = pool.clone();
            thread::spawn(move || {
                let resource = pool.acquire().unwrap();
                thread::sleep(Duration::from_millis(1500));
                assert!(pool.release(resource).is_ok());
            })
        };

        thread::sleep(Duration::from_millis(100));
        let outcome = pool.acquire_timeout(Duration::from_millis(200));
        assert!(matches!(outcome, Err(PoolError::Timeout(_))));
        holder.join().unwrap();
    }

    #[test]
    fn double_release_is_rejected() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());

        let resource = pool.acquire().unwrap();
        assert!(pool.release(resource).is_ok());
        assert_eq!(pool.available_count(), 1);

        // Same identity, already back in the queue
        assert!(pool.release(Handle::with_id(id)).is_err());
        assert_eq!(pool.available_count(), 1);

        // Never borrowed at all
        assert!(pool.release(Handle::new()).is_err());
    }

    #[test]
    fn close_now_wakes_parked_acquirers() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        let resource = pool.acquire().unwrap();

        let waiter = {
            let pool = pool.clone();
            thread::spawn(move || pool.acquire())
        };

        thread::sleep(Duration::from_millis(150));
        pool.close_now();

        assert_eq!(waiter.join().unwrap(), Err(PoolError::Unavailable));
        assert!(pool.release(resource).is_ok());
    }

    #[test]
    fn acquire_blocks_until_supply_appears() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());
        let resource = pool.acquire().unwrap();

        let waiter = {
            let pool = pool.clone();
            thread::spawn(move || pool.acquire())
        };

        thread::sleep(Duration::from_millis(150));
        assert!(pool.release(resource).is_ok());

        let got = waiter.join().unwrap().unwrap();
        assert_eq!(got.id(), id);
    }

    #[test]
    fn seeded_pool_deduplicates() {
        let id = ResourceId::new();
        let pool = Pool::with_resources(
            vec![Handle::with_id(id), Handle::with_id(id), Handle::new()],
            PoolConfig::default().opened(),
        );
        assert_eq!(pool.size(), 2);
        assert!(pool.is_open());
    }

    #[test]
    fn clear_resources_resets_everything() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        assert!(pool.add(Handle::new()).is_ok());
        let _resource = pool.acquire().unwrap();

        pool.clear_resources();
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.available_count(), 0);
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn scoped_borrow_releases_on_drop() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());

        {
            let guard = pool.acquire_scoped().unwrap();
            assert_eq!(guard.id(), id);
            assert_eq!(pool.outstanding_count(), 1);
        }

        assert_eq!(pool.outstanding_count(), 0);
        assert_eq!(pool.available_count(), 1);
    }

    #[tokio::test]
    async fn async_acquire_round_trip() {
        let pool = open_pool();
        let id = ResourceId::new();
        assert!(pool.add(Handle::with_id(id)).is_ok());

        let resource = pool.acquire_async().await.unwrap();
        assert_eq!(resource.id(), id);
        assert!(pool.release(resource).is_ok());
    }

    #[tokio::test]
    async fn async_acquire_fast_fails_when_closed() {
        let pool: Pool<Handle> = Pool::new(PoolConfig::default());
        assert!(pool.add(Handle::new()).is_ok());
        assert_eq!(pool.acquire_async().await, Err(PoolError::Unavailable));
    }

    #[tokio::test]
    async fn async_acquire_times_out() {
        let pool: Pool<Handle> = Pool::new(
            PoolConfig::default()
                .with_timeout(Duration::from_millis(100))
                .opened(),
        );
        assert!(pool.add(Handle::new()).is_ok());
        let held = pool.acquire().unwrap();

        let outcome = pool.acquire_async().await;
        assert!(matches!(outcome, Err(PoolError::Timeout(_))));
        assert!(pool.release(held).is_ok());
    }

    #[tokio::test]
    async fn async_close_drains() {
        let pool = open_pool();
        assert!(pool.add(Handle::new()).is_ok());
        let resource = pool.acquire().unwrap();

        let releaser = {
            let pool = pool.clone();
            tokio::task::spawn_blocking(move || {
                thread::sleep(Duration::from_millis(100));
                assert!(pool.release(resource).is_ok());
            })
        };

        assert!(pool.close_async().await.is_ok());
        assert!(!pool.is_open());
        releaser.await.unwrap();
    }
}
