// src/exit.rs
//! Standardized process exit codes for the `polarion-prep` tools.
//!
//! Provides a stable contract for CI scripts.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PrepExit {
    /// Operation completed successfully.
    Success = 0,
    /// Generic error (I/O, malformed suite counters, Polarion query failure).
    Error = 1,
    /// Wrong command-line usage.
    Usage = 2,
    /// Lookup found no matching test case.
    NotFound = 3,
}

impl PrepExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for PrepExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
