//! crates/logging/src/config.rs
//! Verbosity configuration combining info and debug levels.

use super::levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};

/// Combined verbosity configuration for info and debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct VerbosityConfig {
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (the number of `-v`).
    ///
    /// Level 0 keeps only warnings and errors. Each additional level unlocks
    /// the next tier; anything above 4 behaves like 4.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.info.send = 1;
                config.info.del = 1;
                config.info.resume = 1;
                config.info.misc = 1;
                config.info.stats = 1;
            }
            2 => {
                config.info.set_all(1);
                config.debug.cmd = 2;
                config.debug.plan = 2;
                config.debug.retry = 2;
            }
            3 => {
                config.info.set_all(2);
                config.debug.set_all(2);
            }
            _ => {
                config.info.set_all(3);
                config.debug.set_all(3);
            }
        }

        config
    }

    /// Reports whether an info event at `level` should be emitted.
    pub fn info_gte(&self, flag: InfoFlag, level: u8) -> bool {
        self.info.get(flag) >= level
    }

    /// Reports whether a debug event at `level` should be emitted.
    pub fn debug_gte(&self, flag: DebugFlag, level: u8) -> bool {
        self.debug.get(flag) >= level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_quiet() {
        let config = VerbosityConfig::from_verbose_level(0);
        assert_eq!(config, VerbosityConfig::default());
        assert!(!config.info_gte(InfoFlag::Send, 1));
    }

    #[test]
    fn level_one_enables_transfer_reporting_only() {
        let config = VerbosityConfig::from_verbose_level(1);
        assert!(config.info_gte(InfoFlag::Send, 1));
        assert!(config.info_gte(InfoFlag::Del, 1));
        assert!(!config.info_gte(InfoFlag::Stream, 1));
        assert!(!config.debug_gte(DebugFlag::Cmd, 2));
    }

    #[test]
    fn level_two_enables_command_tracing() {
        let config = VerbosityConfig::from_verbose_level(2);
        assert!(config.info_gte(InfoFlag::Stream, 1));
        assert!(config.debug_gte(DebugFlag::Cmd, 2));
        assert!(!config.debug_gte(DebugFlag::Probe, 2));
    }

    #[test]
    fn high_levels_saturate() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(9),
            VerbosityConfig::from_verbose_level(4)
        );
        assert!(VerbosityConfig::from_verbose_level(4).debug_gte(DebugFlag::Probe, 3));
    }
}
