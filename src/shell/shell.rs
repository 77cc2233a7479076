use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::{self, ExitStatus};

use crate::editor::Editor;
use crate::errors::{Error, ErrorKind, Result, ResultExt};
use crate::execute_command::launch;
use crate::parse::ParsedCommand;
use crate::shell::ShellConfig;
use crate::util::{self, MinshExitStatusExt};

/// Input line that terminates the shell.
pub const EXIT_KEYWORD: &str = "exit";

const HISTORY_FILE_NAME: &str = ".minsh_history";
const SYNTAX_ERROR_EXIT_STATUS: i32 = 2;
const LAUNCH_FAILURE_EXIT_STATUS: i32 = 1;

/// Whether the shell keeps reading input after a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Minsh Shell
#[derive(Debug)]
pub struct Shell {
    /// Responsible for reading lines and for history.
    editor: Editor,
    history_file: Option<PathBuf>,
    /// Exit status of last command executed.
    last_exit_status: ExitStatus,
    config: ShellConfig,
}

impl Shell {
    /// Constructs a new Shell reading from stdin.
    ///
    /// Line editing and command history are only used when stdin is a
    /// terminal and the config enables history.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        let editor = if config.enable_command_history && io::stdin().is_terminal() {
            Editor::with_capacity(config.command_history_capacity)?
        } else {
            Editor::from_stdin(config.display_prompt)
        };

        let mut shell = Shell::with_editor(config, editor);
        if shell.config.enable_command_history && shell.editor.is_terminal() {
            shell.load_history()?;
        }

        info!("minsh started up");
        Ok(shell)
    }

    /// Constructs a Shell reading lines from `editor`.
    pub fn with_editor(config: ShellConfig, editor: Editor) -> Shell {
        Shell {
            editor,
            history_file: None,
            last_exit_status: ExitStatus::from_success(),
            config,
        }
    }

    fn load_history(&mut self) -> Result<()> {
        self.history_file = dirs::home_dir().map(|p| p.join(HISTORY_FILE_NAME));
        if let Some(ref history_file) = self.history_file {
            self.editor.load_history(history_file).or_else(|e| {
                if let ErrorKind::HistoryFile = *e.kind() {
                    warn!("ignoring history file {}: {}", history_file.display(), e);
                    return Ok(());
                }

                Err(e)
            })?;
        } else {
            warn!("unable to get home directory")
        }

        Ok(())
    }

    /// Exit status of the last command executed.
    pub fn last_exit_status(&self) -> ExitStatus {
        self.last_exit_status
    }

    /// Prints the prompt and reads one line.
    /// Returns `None` when end of file is reached.
    pub fn prompt(&mut self) -> Result<Option<String>> {
        self.editor.readline(self.config.prompt())
    }

    /// Runs one line of input.
    ///
    /// Parse errors and launch failures are reported on stderr and do not
    /// stop the shell. Only a failure to wait for a child is returned as an
    /// error.
    pub fn execute_command_string(&mut self, input: &str) -> Result<LoopControl> {
        if input == EXIT_KEYWORD {
            debug!("read exit keyword");
            return Ok(LoopControl::Exit);
        }

        if self.config.enable_command_history && !input.trim().is_empty() {
            self.editor.add_history_entry(input);
        }

        let command = match ParsedCommand::parse_with_limit(input, self.config.max_arguments()) {
            Ok(command) => command,
            Err(e) => {
                self.report_parse_error(e)?;
                return Ok(LoopControl::Continue);
            }
        };

        let outcome = launch(&command)?;
        let code = outcome.exit_status.unwrap_or(LAUNCH_FAILURE_EXIT_STATUS);
        self.last_exit_status = ExitStatus::from_status(code);
        Ok(LoopControl::Continue)
    }

    fn report_parse_error(&mut self, e: Error) -> Result<()> {
        let recoverable = matches!(
            *e.kind(),
            ErrorKind::EmptyCommand | ErrorKind::Syntax(_) | ErrorKind::TooManyArguments(_)
        );
        if !recoverable {
            return Err(e);
        }

        debug!("rejected input: {}", e);
        eprintln!("minsh: {}", e);
        if !matches!(*e.kind(), ErrorKind::EmptyCommand) {
            self.last_exit_status = ExitStatus::from_status(SYNTAX_ERROR_EXIT_STATUS);
        }
        Ok(())
    }

    /// Runs a minsh script from a file, one command per line.
    ///
    /// Blank lines are skipped and an `exit` line stops the script. Bytes
    /// that are not valid UTF-8 are replaced with `U+FFFD`.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoopControl> {
        let path = path.as_ref();
        let mut f = File::open(path).chain_err(|| format!("{}: cannot open", path.display()))?;
        let mut bytes = Vec::new();
        f.read_to_end(&mut bytes)
            .chain_err(|| format!("{}: cannot read", path.display()))?;
        let buffer = String::from_utf8_lossy(&bytes);

        for line in buffer.lines().filter(|line| !line.trim().is_empty()) {
            if self.execute_command_string(line)? == LoopControl::Exit {
                return Ok(LoopControl::Exit);
            }
        }

        Ok(LoopControl::Continue)
    }

    /// Runs commands from stdin until `exit` or EOF is read.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        while let Some(input) = self.prompt()? {
            if self.execute_command_string(&input)? == LoopControl::Exit {
                break;
            }
        }

        Ok(())
    }

    /// Exit the shell.
    ///
    /// Valid exit codes are between 0 and 255. Like bash and its descendents, it automatically
    /// converts exit codes to a u8 such that positive n becomes n % 256 and negative n becomes
    /// (256 + n) % 256.
    ///
    /// Exit the shell with a status of n. If n is None, then the exit status is that of the last
    /// command executed.
    pub fn exit(&mut self, n: Option<ExitStatus>) -> ! {
        if self.config.display_messages && self.editor.is_terminal() {
            println!("exit");
        }

        let status = n.unwrap_or(self.last_exit_status);
        let code = util::code_like_u8(status.code().unwrap_or(LAUNCH_FAILURE_EXIT_STATUS));

        if self.config.enable_command_history {
            if let Some(ref history_file) = self.history_file {
                if let Err(e) = self.editor.save_history(history_file) {
                    error!(
                        "error: failed to save history to file during shutdown: {}",
                        e
                    );
                }
            }
        }

        info!("minsh has shut down");
        process::exit(code);
    }
}
