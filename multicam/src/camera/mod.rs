//! Camera capture module
//!
//! Provides camera configuration, the per-device capture cycle, and
//! synchronized capture across a camera array.

pub mod array;
pub mod config;
pub mod device;

pub use array::CameraArray;
pub use config::CameraConfig;
pub use device::Camera;

use crate::error::CycleResult;
use std::thread::ScopedJoinHandle;

/// Joins a worker thread, re-raising its panic on the calling thread.
///
/// Collaborator failures come back as values; a panic is a bug in the
/// cycle itself and is not converted into a capture error.
pub(crate) fn join_worker(handle: ScopedJoinHandle<'_, CycleResult>) -> CycleResult {
    match handle.join() {
        Ok(outcome) => outcome,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
