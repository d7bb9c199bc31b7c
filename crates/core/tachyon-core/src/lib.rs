//! Core substrate for the Tachyon kernel: locking primitives and the
//! leveled logging facade used by every other subsystem crate.

#![cfg_attr(not(test), no_std)]

pub mod log;
pub mod sync;

pub use sync::{SpinLock, SpinLockGuard};
