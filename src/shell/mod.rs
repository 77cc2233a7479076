//! Minsh - Shell Module
//!
//! The Shell reads lines, runs each one as a command and tracks the exit
//! status of the last command.

pub use self::shell::{LoopControl, Shell, EXIT_KEYWORD};

#[allow(clippy::module_inception)]
mod shell;

use crate::parse::DEFAULT_MAX_ARGUMENTS;

/// Prompt printed before each line is read.
pub const DEFAULT_PROMPT: &str = "minsh> ";

/// Policy object to control a Shell's behavior
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Determines if new command entries will be added to the shell's command history.
    ///
    /// Note: This is checked before the other command history config fields.
    enable_command_history: bool,

    /// Number of entries to store in the shell's command history
    command_history_capacity: usize,

    /// Determines if the prompt is printed before each line is read.
    display_prompt: bool,

    /// Determines if some messages (e.g. "exit") should be displayed.
    display_messages: bool,

    prompt: String,

    /// Upper bound on the number of arguments of a single command.
    max_arguments: usize,
}

impl ShellConfig {
    /// Creates an interactive shell, e.g. prompt and command history
    ///
    /// # Complete List
    /// - Command History is enabled when stdin is a terminal
    /// - The prompt is printed before every line
    /// - Some additional messages are displayed
    pub fn interactive(command_history_capacity: usize) -> ShellConfig {
        ShellConfig {
            enable_command_history: true,
            command_history_capacity,
            display_prompt: true,
            display_messages: true,
            ..Default::default()
        }
    }

    /// Creates a noninteractive shell for `-c` strings and script files
    ///
    /// # Complete List
    /// - Command History is disabled. Commands are not saved.
    /// - No prompt is printed.
    /// - Fewer messages are displayed
    pub fn noninteractive() -> ShellConfig {
        Default::default()
    }

    /// Sets the prompt printed before each line is read.
    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> ShellConfig {
        self.prompt = prompt.into();
        self
    }

    /// Sets the maximum number of arguments a command may carry.
    pub fn with_max_arguments(mut self, max_arguments: usize) -> ShellConfig {
        self.max_arguments = max_arguments;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_arguments(&self) -> usize {
        self.max_arguments
    }
}

impl Default for ShellConfig {
    fn default() -> ShellConfig {
        ShellConfig {
            enable_command_history: false,
            command_history_capacity: 0,
            display_prompt: false,
            display_messages: false,
            prompt: DEFAULT_PROMPT.to_string(),
            max_arguments: DEFAULT_MAX_ARGUMENTS,
        }
    }
}
