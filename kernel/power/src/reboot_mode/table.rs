//! The mode table and its two-pass command lookup.

use alloc::string::String;
use alloc::vec::Vec;

/// Mode substituted when the reboot command carries no argument.
const FALLBACK_MODE: &str = "normal";

/// Longest command accepted by the normalization pass, in bytes.
///
/// Commands beyond this are rejected during pass 2 rather than copied;
/// realistic reboot commands are far shorter, so this is purely a
/// defensive bound. An exact (pass 1) match is not length-limited.
pub(crate) const CMD_MAX: usize = 109;

/// One registered reboot mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeEntry {
    mode: String,
    magic: u64,
}

impl ModeEntry {
    pub(crate) fn new(mode: impl Into<String>, magic: u64) -> Self {
        Self {
            mode: mode.into(),
            magic,
        }
    }

    /// Returns the mode name.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Returns the magic value written to hardware for this mode.
    #[must_use]
    pub fn magic(&self) -> u64 {
        self.magic
    }
}

/// Ordered table of reboot modes, in configuration enumeration order.
///
/// Duplicate names are not rejected; lookup scans in order, so the
/// first-registered entry shadows any later one with the same name.
#[derive(Debug, Default)]
pub struct ModeTable {
    entries: Vec<ModeEntry>,
}

impl ModeTable {
    pub(crate) fn push(&mut self, entry: ModeEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of registered modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the magic of the first entry named exactly `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.mode == name)
            .map(ModeEntry::magic)
    }

    /// Resolves a reboot command to a magic value.
    ///
    /// An absent command means a plain reboot and resolves as `"normal"`.
    /// Lookup is two-pass: first the command as given, then -- because
    /// commands arrive from the kernel command line and the reboot syscall
    /// with separators a configuration property name cannot contain -- a
    /// copy with every space, comma, and slash replaced by `-`. Returns
    /// `None` when neither pass matches; the caller treats that as "write
    /// nothing".
    #[must_use]
    pub fn resolve(&self, cmd: Option<&str>) -> Option<u64> {
        let cmd = cmd.unwrap_or(FALLBACK_MODE);

        if let Some(magic) = self.lookup(cmd) {
            return Some(magic);
        }

        if cmd.len() > CMD_MAX {
            return None;
        }
        let normalized: String = cmd
            .chars()
            .map(|c| if matches!(c, ' ' | ',' | '/') { '-' } else { c })
            .collect();
        self.lookup(&normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, u64)]) -> ModeTable {
        let mut t = ModeTable::default();
        for &(mode, magic) in entries {
            t.push(ModeEntry::new(mode, magic));
        }
        t
    }

    #[test]
    fn exact_match_first_pass() {
        let t = table(&[("recovery", 42)]);
        assert_eq!(t.resolve(Some("recovery")), Some(42));
    }

    #[test]
    fn absent_command_means_normal() {
        let t = table(&[("normal", 7), ("recovery", 42)]);
        assert_eq!(t.resolve(None), Some(7));
        assert_eq!(t.resolve(None), t.resolve(Some("normal")));
    }

    #[test]
    fn separators_normalize_to_hyphen() {
        let t = table(&[("fastboot-usb", 0xfb)]);
        assert_eq!(t.resolve(Some("fastboot usb")), Some(0xfb));
        assert_eq!(t.resolve(Some("fastboot,usb")), Some(0xfb));
        assert_eq!(t.resolve(Some("fastboot/usb")), Some(0xfb));
    }

    #[test]
    fn unknown_command_yields_no_match() {
        let t = table(&[("recovery", 1)]);
        assert_eq!(t.resolve(Some("bootloader")), None);
    }

    #[test]
    fn first_registered_duplicate_wins() {
        let t = table(&[("recovery", 1), ("recovery", 2)]);
        assert_eq!(t.resolve(Some("recovery")), Some(1));
    }

    #[test]
    fn overlong_command_skips_normalization() {
        let long_cmd = "x ".repeat(60); // 120 bytes, would normalize to x-x-...
        let normalized: String = long_cmd.replace(' ', "-");
        let t = table(&[(normalized.as_str(), 9)]);
        assert_eq!(t.resolve(Some(&long_cmd)), None);
    }

    #[test]
    fn overlong_command_still_exact_matches() {
        let long_name = "m".repeat(CMD_MAX + 20);
        let t = table(&[(long_name.as_str(), 5)]);
        assert_eq!(t.resolve(Some(&long_name)), Some(5));
    }

    #[test]
    fn boundary_length_command_normalizes() {
        let cmd = format!("{} tail", "a".repeat(CMD_MAX - 5)); // exactly CMD_MAX bytes
        assert_eq!(cmd.len(), CMD_MAX);
        let name = cmd.replace(' ', "-");
        let t = table(&[(name.as_str(), 3)]);
        assert_eq!(t.resolve(Some(&cmd)), Some(3));
    }
}
