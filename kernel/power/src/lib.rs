//! Reboot plumbing for the Tachyon kernel.
//!
//! Two pieces live here:
//!
//! - [`notifier`] -- the reboot notifier chain: an explicit event bus that
//!   delivers the reboot reason and optional command string synchronously
//!   to subscribers, in subscription order, just before the platform
//!   resets the machine.
//! - [`reboot_mode`] -- the reboot-mode driver core: maps named reboot
//!   modes ("recovery", "bootloader", ...) declared in a device's
//!   configuration node to numeric magic values, and arranges for the
//!   matching magic to be handed to a platform [`MagicWriter`] when the
//!   system reboots with that mode as its command.
//!
//! [`device`] carries the thin slice of the device model these need: the
//! parsed configuration node and devres-style scoped cleanup.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod device;
pub mod error;
pub mod notifier;
pub mod reboot_mode;

pub use device::{ConfigNode, ConfigProperty, Device};
pub use error::RebootModeError;
pub use notifier::{NotifierAction, NotifierHandle, RebootNotifier, RebootReason};
pub use reboot_mode::{MagicWriter, ModeEntry, ModeTable, RebootModeDriver};
