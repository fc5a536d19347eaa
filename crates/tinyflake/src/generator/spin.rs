use core::{
    cell::UnsafeCell,
    fmt,
    hint::spin_loop,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};
use portable_atomic::{AtomicBool, Ordering};

/// A test-and-test-and-set spin lock.
///
/// Waiters busy-loop on a relaxed load and only retry the exchange once the
/// lock looks free, so contended waiting stays in the local cache. The lock
/// never poisons: a panic while holding it simply releases it on unwind.
///
/// Meant for critical sections that do no I/O and finish in nanoseconds to
/// (at worst) about a millisecond.
pub struct SpinLock<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `locked`.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, spinning until it is available.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        loop {
            if self.try_acquire_weak() {
                return self.guard();
            }
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
    }

    /// Acquires the lock if it is free, without spinning.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| self.guard())
    }

    /// May fail spuriously; only for use inside the `lock` retry loop.
    #[inline]
    fn try_acquire_weak(&self) -> bool {
        self.locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    fn guard(&self) -> SpinLockGuard<'_, T> {
        SpinLockGuard {
            lock: self,
            _marker: PhantomData,
        }
    }

    /// Returns a mutable reference without locking; `&mut self` already
    /// proves exclusive access.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.locked.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// RAII guard for [`SpinLock`]. The lock is released on drop.
///
/// Like a `MutexGuard`, the guard is `Sync` only when `T` is, so a shared
/// reference to it cannot hand a `!Sync` value to another thread:
///
/// ```compile_fail
/// use std::cell::Cell;
/// use tinyflake::SpinLockGuard;
///
/// fn assert_sync<S: Sync>() {}
/// assert_sync::<SpinLockGuard<'static, Cell<u32>>>();
/// ```
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
    _marker: PhantomData<&'a mut T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock.
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::scope;

    #[test]
    fn try_lock_fails_while_held() {
        let lock = SpinLock::new(0u32);
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn try_lock_succeeds_on_free_lock() {
        let lock = SpinLock::new(0u32);
        for _ in 0..10_000 {
            let guard = lock.try_lock();
            assert!(guard.is_some());
        }
    }

    #[test]
    fn guard_is_sync_only_for_sync_values() {
        fn assert_sync<S: Sync>() {}
        fn assert_send<S: Send>() {}
        assert_sync::<SpinLock<std::cell::Cell<u32>>>();
        assert_sync::<SpinLockGuard<'static, u32>>();
        assert_send::<SpinLock<std::cell::Cell<u32>>>();
    }

    #[test]
    fn lock_serializes_increments() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 10_000;

        let lock = SpinLock::new(0usize);
        scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..PER_THREAD {
                        *lock.lock() += 1;
                    }
                });
            }
        });
        assert_eq!(*lock.lock(), THREADS * PER_THREAD);
    }

    #[test]
    fn panic_while_held_releases_lock() {
        let lock = SpinLock::new(1u8);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let guard = lock.lock();
            if *guard == 1 {
                panic!("boom");
            }
        }));
        assert!(result.is_err());
        assert_eq!(*lock.lock(), 1);
    }
}
