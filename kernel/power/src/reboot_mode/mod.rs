//! Reboot-mode driver core.
//!
//! A platform reset driver owns some piece of persistent hardware state
//! (a scratch register, a PMU word) that the next boot stage inspects to
//! decide what to boot into. Boards declare the vocabulary in the driver's
//! configuration node as `mode-` properties:
//!
//! ```text
//! mode-normal     = <0x0>;
//! mode-recovery   = <0x1>;
//! mode-bootloader = <0x5242_0001 0x1>;   // optional second cell = high half
//! ```
//!
//! [`RebootModeDriver`] parses those into a [`ModeTable`] at registration
//! time and hooks the reboot notifier chain; when the system reboots with
//! a command string, the matching magic (if any) is handed to the
//! platform's [`MagicWriter`]. An unrecognized command degrades to a plain
//! reboot with no magic written -- this core never blocks a reboot.

mod table;

pub use table::{ModeEntry, ModeTable};

use alloc::sync::Arc;

use tachyon_core::{SpinLock, kdebug, kerror};

use crate::device::{ConfigNode, Device};
use crate::error::RebootModeError;
use crate::notifier::{NotifierAction, NotifierHandle, RebootNotifier};

/// Configuration property prefix marking a reboot-mode declaration.
pub const MODE_PREFIX: &str = "mode-";

/// The platform's persistent-storage write, injected at construction.
///
/// Fire-and-forget: the write happens on the reboot path where nothing can
/// act on a failure, so none is reported.
pub trait MagicWriter: Send + Sync {
    /// Writes `magic` to the hardware the next boot stage will read.
    fn write_magic(&self, magic: u64);
}

struct DriverState {
    table: ModeTable,
    hook: Option<NotifierHandle>,
}

/// A registered set of reboot modes bound to one piece of reset hardware.
///
/// Constructed empty, populated once by [`register`], consulted from the
/// reboot notifier chain, torn down once by [`unregister`]. The lock
/// serializes table access between registration, teardown, and the
/// notifier callback; the hardware write itself happens outside it.
///
/// [`register`]: RebootModeDriver::register
/// [`unregister`]: RebootModeDriver::unregister
pub struct RebootModeDriver {
    state: SpinLock<DriverState>,
    writer: Arc<dyn MagicWriter>,
}

impl RebootModeDriver {
    /// Creates an empty driver around the platform's writer.
    #[must_use]
    pub fn new(writer: Arc<dyn MagicWriter>) -> Arc<Self> {
        Arc::new(Self {
            state: SpinLock::new(DriverState {
                table: ModeTable::default(),
                hook: None,
            }),
            writer,
        })
    }

    /// Populates the mode table from `node` and goes live on `notifier`.
    ///
    /// Every property named `mode-<name>` contributes one entry: cell 0 is
    /// the low 32 bits of the magic, optional cell 1 the high 32 bits. A
    /// property with no cells is logged and skipped. An empty `<name>`
    /// aborts the whole registration; no partial table survives an error.
    ///
    /// Must be paired with [`unregister`](Self::unregister); registering
    /// an already-live driver again is a caller contract violation.
    ///
    /// # Errors
    ///
    /// [`RebootModeError::InvalidModeName`] on an empty stripped name.
    pub fn register(
        self: &Arc<Self>,
        notifier: &Arc<RebootNotifier>,
        node: &ConfigNode,
    ) -> Result<(), RebootModeError> {
        let mut state = self.state.lock();

        for prop in node.properties() {
            let Some(mode) = prop.name().strip_prefix(MODE_PREFIX) else {
                continue;
            };
            let Some(arg1) = prop.u32_at(0) else {
                kerror!("reboot mode {:?} without magic number", prop.name());
                continue;
            };
            let arg2 = prop.u32_at(1).unwrap_or(0);

            if mode.is_empty() {
                kerror!("invalid mode name {:?}: too short", prop.name());
                state.table.clear();
                return Err(RebootModeError::InvalidModeName);
            }

            let magic = (u64::from(arg2) << 32) | u64::from(arg1);
            state.table.push(ModeEntry::new(mode, magic));
        }

        let driver = Arc::clone(self);
        state.hook = Some(notifier.subscribe(move |_reason, cmd: Option<&str>| driver.on_reboot(cmd)));
        kdebug!("registered {} reboot modes", state.table.len());
        Ok(())
    }

    /// Takes the driver off the chain and frees the mode table.
    ///
    /// The hook is removed before the table is cleared, so no new
    /// notification can observe teardown; one already in flight finishes
    /// under the lock first.
    pub fn unregister(&self, notifier: &RebootNotifier) {
        let hook = self.state.lock().hook.take();
        if let Some(handle) = hook {
            notifier.unsubscribe(handle);
        }
        self.state.lock().table.clear();
    }

    /// Notifier callback: resolve under the lock, write outside it.
    fn on_reboot(&self, cmd: Option<&str>) -> NotifierAction {
        let magic = self.state.lock().table.resolve(cmd);
        if let Some(magic) = magic {
            self.writer.write_magic(magic);
        }
        // Never veto a reboot, matched mode or not.
        NotifierAction::Continue
    }
}

/// Registers `driver` from `dev`'s configuration node and files a devres
/// action so the device's destruction unregisters it automatically.
///
/// # Errors
///
/// [`RebootModeError::NoConfig`] if the device has no configuration node
/// (nothing is filed); any [`RebootModeDriver::register`] error, in which
/// case nothing is filed either.
pub fn register_managed(
    driver: &Arc<RebootModeDriver>,
    dev: &Device,
    notifier: &Arc<RebootNotifier>,
) -> Result<(), RebootModeError> {
    let node = dev.config().ok_or(RebootModeError::NoConfig)?;
    driver.register(notifier, node)?;

    let owned = Arc::clone(driver);
    let chain = Arc::clone(notifier);
    dev.add_action(devres_key(driver), move || owned.unregister(&chain));
    Ok(())
}

/// Unregisters a [`register_managed`] driver ahead of device destruction.
///
/// Matches the action filed for this exact driver instance (by identity,
/// not value) and runs it now; the later device drop will not run it
/// again. Returns whether an action was found.
pub fn unregister_managed(driver: &Arc<RebootModeDriver>, dev: &Device) -> bool {
    dev.release_action(devres_key(driver))
}

fn devres_key(driver: &Arc<RebootModeDriver>) -> usize {
    Arc::as_ptr(driver) as usize
}
