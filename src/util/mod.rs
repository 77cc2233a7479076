use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Minsh Utility Extensions for `ExitStatus`
pub trait MinshExitStatusExt {
    /// Create an ExitStatus to indicate *successful* program execution.
    fn from_success() -> Self;

    /// Create an ExitStatus to indicate *unsuccessful* program execution.
    fn from_failure() -> Self;

    /// Create an ExitStatus from a status code
    fn from_status(code: i32) -> Self;
}

impl MinshExitStatusExt for ExitStatus {
    /// # Examples
    /// ```rust
    /// use minsh::MinshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_success().success());
    /// ```
    fn from_success() -> Self {
        ExitStatus::from_status(0)
    }

    /// # Examples
    /// ```rust
    /// use minsh::MinshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(!ExitStatus::from_failure().success());
    /// ```
    fn from_failure() -> Self {
        ExitStatus::from_status(1)
    }

    /// # Examples
    /// ```rust
    /// use minsh::MinshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_status(0).success());
    /// assert!(!ExitStatus::from_status(1).success());
    /// ```
    fn from_status(code: i32) -> Self {
        ExitStatus::from_raw((code & 0xff) << 8)
    }
}

/// Reduces an exit code to `0..=255` the way bash does: positive `n` becomes
/// `n % 256` and negative `n` becomes `(256 + n) % 256`.
pub fn code_like_u8(code: i32) -> i32 {
    code.rem_euclid(256)
}
