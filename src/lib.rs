//! Minsh - a minimal command interpreter
//!
//! Reads a line, splits it into a program, its arguments and an optional
//! `> file` redirection, then forks a child that redirects its standard output
//! and replaces itself with the program while the parent waits for it.

#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

/// Logs the error of a `Result` that the caller intends to ignore.
#[macro_export]
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), e);
        }
    };
    ($result:expr, $fmt:expr, $($arg:tt)*) => {
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), $($arg)*, e);
        }
    };
}

mod editor;
pub mod errors;
pub mod execute_command;
pub mod parse;
pub mod shell;
mod util;

pub use crate::editor::Editor;
pub use crate::execute_command::{launch, ChildOutcome};
pub use crate::parse::{ParsedCommand, ParsedCommandBuilder};
pub use crate::shell::{LoopControl, Shell, ShellConfig};
pub use crate::util::MinshExitStatusExt;
