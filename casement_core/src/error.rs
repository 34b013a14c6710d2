// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Transient conditions (the component has no native peer yet, the platform
//! declined the lock) are not errors: they are reported through
//! [`LockStatus`](crate::surface::LockStatus). The types here cover caller
//! contract violations and native failures.

use std::thread::ThreadId;

/// Misuse of a [`RecursiveLock`](crate::lock::RecursiveLock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// Unlock was requested while no thread held the lock.
    #[error("lock is not held")]
    NotLocked,
    /// Unlock was requested by a thread that does not own the lock.
    #[error("lock is held by another thread ({owner:?})")]
    NotOwner {
        /// The thread that currently owns the lock.
        owner: ThreadId,
    },
}

/// Errors raised by surface, layer, and platform operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// A lock contract was violated.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// An offscreen layer operation was requested on a surface whose native
    /// handle does not use an offscreen layer.
    #[error("not an offscreen layer surface")]
    NotOffscreenLayerSurface,

    /// `detach` was requested while no offscreen layer is attached.
    #[error("no offscreen layer attached")]
    NoLayerAttached,

    /// The platform variant does not implement this operation.
    #[error("{0} not supported by this platform")]
    Unsupported(&'static str),

    /// A native step failed.
    #[error("native {op} failed: {message}")]
    Platform {
        /// Which native step failed (e.g. `"fetch"`, `"lock"`).
        op: &'static str,
        /// Platform-provided detail.
        message: String,
    },
}

impl SurfaceError {
    /// Builds a [`SurfaceError::Platform`] for the given native step.
    pub fn platform(op: &'static str, message: impl Into<String>) -> Self {
        Self::Platform {
            op,
            message: message.into(),
        }
    }
}
