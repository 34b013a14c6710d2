// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-owned reentrant lock with an observable hold count.
//!
//! [`RecursiveLock`] is the primitive behind both the per-surface lock and
//! the default [`SharedDisplayDevice`](crate::device::SharedDisplayDevice)
//! lock. Unlike a guard-based mutex it exposes explicit `lock` / `unlock`
//! calls, because the surface protocol hands the lock across API calls
//! (`lock_surface` … `unlock_surface`) rather than a lexical scope.
//!
//! There is no fairness guarantee beyond what the underlying
//! [`parking_lot`] primitives provide, and no timeout: a contended
//! [`lock`](RecursiveLock::lock) waits indefinitely.

use std::fmt;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::error::LockError;

#[derive(Clone, Copy, Debug, Default)]
struct LockState {
    owner: Option<ThreadId>,
    holds: usize,
}

/// A reentrant lock owned by at most one thread at a time.
///
/// The owning thread may call [`lock`](Self::lock) any number of times
/// without blocking; each call must be balanced by one
/// [`unlock`](Self::unlock). Other threads block until the hold count
/// returns to zero.
pub struct RecursiveLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl Default for RecursiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecursiveLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("RecursiveLock")
            .field("owner", &state.owner)
            .field("holds", &state.holds)
            .finish()
    }
}

impl RecursiveLock {
    /// Creates an unlocked lock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState {
                owner: None,
                holds: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Acquires the lock, re-entering if the calling thread already owns it.
    ///
    /// Returns the hold count after acquisition; `1` means this call was the
    /// outermost (cold) acquisition.
    pub fn lock(&self) -> usize {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            match state.owner {
                None => {
                    state.owner = Some(me);
                    state.holds = 1;
                    return 1;
                }
                Some(owner) if owner == me => {
                    state.holds += 1;
                    return state.holds;
                }
                Some(_) => self.released.wait(&mut state),
            }
        }
    }

    /// Acquires the lock only if that is possible without blocking.
    ///
    /// Returns the new hold count, or `None` if another thread owns the lock.
    pub fn try_lock(&self) -> Option<usize> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        match state.owner {
            None => {
                state.owner = Some(me);
                state.holds = 1;
                Some(1)
            }
            Some(owner) if owner == me => {
                state.holds += 1;
                Some(state.holds)
            }
            Some(_) => None,
        }
    }

    /// Releases one hold, returning the remaining hold count.
    ///
    /// When the count reaches zero the lock is released and one waiting
    /// thread is woken.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::NotLocked`] if nobody holds the lock, or
    /// [`LockError::NotOwner`] if another thread does. The lock state is not
    /// modified in either case.
    pub fn try_unlock(&self) -> Result<usize, LockError> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        match state.owner {
            None => Err(LockError::NotLocked),
            Some(owner) if owner != me => Err(LockError::NotOwner { owner }),
            Some(_) => {
                state.holds -= 1;
                if state.holds == 0 {
                    state.owner = None;
                    drop(state);
                    self.released.notify_one();
                    return Ok(0);
                }
                Ok(state.holds)
            }
        }
    }

    /// Releases one hold, returning the remaining hold count.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not own the lock.
    pub fn unlock(&self) -> usize {
        match self.try_unlock() {
            Ok(holds) => holds,
            Err(err) => panic!("RecursiveLock::unlock: {err}"),
        }
    }

    /// Checks that the calling thread owns the lock.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::NotLocked`] if nobody holds the lock, or
    /// [`LockError::NotOwner`] if another thread does.
    pub fn check_locked(&self) -> Result<(), LockError> {
        let me = thread::current().id();
        match self.state.lock().owner {
            None => Err(LockError::NotLocked),
            Some(owner) if owner != me => Err(LockError::NotOwner { owner }),
            Some(_) => Ok(()),
        }
    }

    /// Checks that the calling thread owns the lock.
    ///
    /// # Panics
    ///
    /// Panics if the lock is unlocked or owned by another thread.
    pub fn validate_locked(&self) {
        if let Err(err) = self.check_locked() {
            panic!("RecursiveLock::validate_locked: {err}");
        }
    }

    /// Returns whether the calling thread owns the lock.
    #[must_use]
    pub fn is_locked_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    /// Returns whether a thread other than the caller owns the lock.
    #[must_use]
    pub fn is_locked_by_other_thread(&self) -> bool {
        matches!(self.state.lock().owner, Some(owner) if owner != thread::current().id())
    }

    /// Returns whether any thread owns the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.lock().owner.is_some()
    }

    /// Returns the owning thread, if any.
    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        self.state.lock().owner
    }

    /// Returns the current owner's hold count (zero when unlocked).
    #[must_use]
    pub fn hold_count(&self) -> usize {
        self.state.lock().holds
    }
}
