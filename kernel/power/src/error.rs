//! Power subsystem error types.

use core::fmt;

/// Errors that can occur while registering a reboot-mode driver.
///
/// Registration is all-or-nothing: on error the driver's mode table is
/// left empty and the shutdown hook is not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootModeError {
    /// The owning device has no configuration node to read modes from.
    NoConfig,
    /// A `mode-` property's name is empty after the prefix is stripped.
    InvalidModeName,
}

impl fmt::Display for RebootModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfig => f.write_str("device has no configuration node"),
            Self::InvalidModeName => f.write_str("empty reboot mode name"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_variants() {
        assert_eq!(
            format!("{}", RebootModeError::NoConfig),
            "device has no configuration node"
        );
        assert_eq!(
            format!("{}", RebootModeError::InvalidModeName),
            "empty reboot mode name"
        );
    }

    #[test]
    fn error_equality() {
        assert_eq!(RebootModeError::NoConfig, RebootModeError::NoConfig);
        assert_ne!(RebootModeError::NoConfig, RebootModeError::InvalidModeName);
    }
}
