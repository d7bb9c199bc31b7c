//! The slice of the device model the power subsystem consumes: parsed
//! configuration properties and devres-style scoped cleanup.
//!
//! Configuration arrives already decoded from whatever firmware table the
//! platform uses (FDT, ACPI `_DSD`, board files); this module only models
//! the result: an ordered list of named properties, each carrying zero or
//! more 32-bit value cells.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use tachyon_core::SpinLock;

// ---------------------------------------------------------------------------
// Configuration properties
// ---------------------------------------------------------------------------

/// One named configuration property with its decoded 32-bit value cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigProperty {
    name: String,
    cells: Vec<u32>,
}

impl ConfigProperty {
    /// Creates a property from a name and its value cells.
    pub fn new(name: impl Into<String>, cells: impl Into<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            cells: cells.into(),
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value cell at `index`, if present.
    #[must_use]
    pub fn u32_at(&self, index: usize) -> Option<u32> {
        self.cells.get(index).copied()
    }
}

/// An ordered set of properties from one configuration node.
///
/// Iteration order is the order properties were pushed, which platform
/// glue keeps equal to firmware enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    props: Vec<ConfigProperty>,
}

impl ConfigNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property, preserving enumeration order.
    pub fn push(&mut self, prop: ConfigProperty) {
        self.props.push(prop);
    }

    /// Iterates properties in enumeration order.
    pub fn properties(&self) -> impl Iterator<Item = &ConfigProperty> {
        self.props.iter()
    }
}

// ---------------------------------------------------------------------------
// Device + devres actions
// ---------------------------------------------------------------------------

struct DevresAction {
    key: usize,
    release: Box<dyn FnOnce() + Send>,
}

/// A device as seen by this subsystem: a name, an optional configuration
/// node, and a list of scoped cleanup actions.
///
/// Actions run at most once each: either early via [`release_action`]
/// (keyed lookup) or, for whatever is still filed, when the device is
/// dropped -- in reverse filing order, mirroring teardown of a probe
/// sequence.
///
/// [`release_action`]: Device::release_action
pub struct Device {
    name: String,
    config: Option<ConfigNode>,
    actions: SpinLock<Vec<DevresAction>>,
}

impl Device {
    /// Creates a device with an optional configuration node.
    #[must_use]
    pub fn new(name: impl Into<String>, config: Option<ConfigNode>) -> Self {
        Self {
            name: name.into(),
            config,
            actions: SpinLock::new(Vec::new()),
        }
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device's configuration node, if it has one.
    #[must_use]
    pub fn config(&self) -> Option<&ConfigNode> {
        self.config.as_ref()
    }

    /// Files a cleanup action under `key`, to run when the device is
    /// dropped unless released early first.
    ///
    /// Keys are caller-chosen; filing the same key twice files two
    /// independent actions.
    pub fn add_action(&self, key: usize, release: impl FnOnce() + Send + 'static) {
        self.actions.lock().push(DevresAction {
            key,
            release: Box::new(release),
        });
    }

    /// Runs and removes the most recently filed action under `key`.
    ///
    /// Returns whether an action was found. A released action will not run
    /// again on drop, so explicit release followed by drop tears down
    /// exactly once.
    pub fn release_action(&self, key: usize) -> bool {
        let action = {
            let mut actions = self.actions.lock();
            let index = actions.iter().rposition(|a| a.key == key);
            index.map(|i| actions.remove(i))
        };
        // Run outside the lock: releases may take other locks.
        match action {
            Some(action) => {
                (action.release)();
                true
            }
            None => false,
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let actions = core::mem::take(self.actions.get_mut());
        for action in actions.into_iter().rev() {
            (action.release)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use alloc::vec;

    #[test]
    fn property_cells() {
        let prop = ConfigProperty::new("mode-recovery", [0x5242_0001, 0x1]);
        assert_eq!(prop.name(), "mode-recovery");
        assert_eq!(prop.u32_at(0), Some(0x5242_0001));
        assert_eq!(prop.u32_at(1), Some(0x1));
        assert_eq!(prop.u32_at(2), None);
    }

    #[test]
    fn node_preserves_order() {
        let mut node = ConfigNode::new();
        node.push(ConfigProperty::new("b", [2]));
        node.push(ConfigProperty::new("a", [1]));
        let names: Vec<&str> = node.properties().map(ConfigProperty::name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn drop_runs_actions_in_reverse() {
        let order = Arc::new(SpinLock::new(Vec::new()));
        let dev = Device::new("dev0", None);
        for tag in [1, 2, 3] {
            let order = Arc::clone(&order);
            dev.add_action(tag, move || order.lock().push(tag));
        }
        drop(dev);
        assert_eq!(*order.lock(), vec![3, 2, 1]);
    }

    #[test]
    fn release_action_is_at_most_once() {
        let count = Arc::new(SpinLock::new(0u32));
        let dev = Device::new("dev0", None);
        {
            let count = Arc::clone(&count);
            dev.add_action(42, move || *count.lock() += 1);
        }

        assert!(dev.release_action(42));
        assert!(!dev.release_action(42));
        drop(dev);
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn release_unknown_key_is_noop() {
        let dev = Device::new("dev0", None);
        assert!(!dev.release_action(7));
    }
}
