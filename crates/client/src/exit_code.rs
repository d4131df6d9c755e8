//! Process exit codes.
//!
//! Codes follow rsync's numbering where a counterpart exists, so scripts that
//! already interpret rsync exit statuses read zrsync's the same way.

use std::fmt;

/// Exit status of a zrsync run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Everything replicated.
    Ok = 0,

    /// Invalid arguments or configuration.
    Syntax = 1,

    /// The source dataset could not be selected.
    FileSelect = 3,

    /// The requested replication cannot be performed safely, for example an
    /// encrypted source with an unencrypted destination.
    Unsupported = 4,

    /// A command could not be started.
    StartClient = 5,

    /// A snapshot engine command failed.
    FileIo = 11,

    /// Replication would destroy history the policy does not allow
    /// destroying.
    Refused = 25,

    /// A required program was not found.
    CommandNotFound = 127,
}

impl ExitCode {
    /// Returns the numeric status.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a short description of the code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::FileSelect => "errors selecting source dataset",
            Self::Unsupported => "requested action not supported",
            Self::StartClient => "error starting command",
            Self::FileIo => "error in snapshot engine command",
            Self::Refused => "refused to destroy destination history",
            Self::CommandNotFound => "command not found",
        }
    }

    /// Returns `true` for [`ExitCode::Ok`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(u8::try_from(code.as_i32()).unwrap_or(u8::MAX))
    }
}

/// Types that determine a process exit status.
pub trait HasExitCode {
    /// Returns the exit code associated with this value.
    fn exit_code(&self) -> ExitCode;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_rsync_numbering() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert_eq!(ExitCode::Syntax.as_i32(), 1);
        assert_eq!(ExitCode::FileSelect.as_i32(), 3);
        assert_eq!(ExitCode::Unsupported.as_i32(), 4);
        assert_eq!(ExitCode::StartClient.as_i32(), 5);
        assert_eq!(ExitCode::FileIo.as_i32(), 11);
        assert_eq!(ExitCode::Refused.as_i32(), 25);
        assert_eq!(ExitCode::CommandNotFound.as_i32(), 127);
    }

    #[test]
    fn only_ok_is_success() {
        assert!(ExitCode::Ok.is_success());
        assert!(!ExitCode::FileIo.is_success());
    }

    #[test]
    fn display_shows_description() {
        assert_eq!(ExitCode::Refused.to_string(), "refused to destroy destination history");
        assert_eq!(i32::from(ExitCode::FileIo), 11);
    }
}
