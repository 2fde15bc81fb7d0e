//! Boot-time configuration for the descriptor tables.

use log::LevelFilter;
use x86_64::PrivilegeLevel;

/// Knobs that affect how the tables are built.
///
/// The segment layout and the PIC vector offsets are fixed; only the gate
/// privilege and the log verbosity are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Lowest ring allowed to raise an installed gate with `int n`.
    pub gate_privilege: PrivilegeLevel,
    /// Maximum level emitted by the serial logger.
    pub log_level: LevelFilter,
}

impl Config {
    /// Ring 0 gates unless the `user-gates` feature is enabled.
    pub const fn new() -> Self {
        Self {
            gate_privilege: if cfg!(feature = "user-gates") {
                PrivilegeLevel::Ring3
            } else {
                PrivilegeLevel::Ring0
            },
            log_level: LevelFilter::Info,
        }
    }

    pub const fn with_gate_privilege(mut self, ring: PrivilegeLevel) -> Self {
        self.gate_privilege = ring;
        self
    }

    pub const fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gate_privilege_follows_feature() {
        let expected = if cfg!(feature = "user-gates") {
            PrivilegeLevel::Ring3
        } else {
            PrivilegeLevel::Ring0
        };
        assert_eq!(Config::new().gate_privilege, expected);
        assert_eq!(Config::default(), Config::new());
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::new()
            .with_gate_privilege(PrivilegeLevel::Ring3)
            .with_log_level(LevelFilter::Trace);
        assert_eq!(config.gate_privilege, PrivilegeLevel::Ring3);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }
}
