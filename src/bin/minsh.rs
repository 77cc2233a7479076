#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

use std::path::PathBuf;
use std::process::{self, ExitStatus};

use docopt::Docopt;
use minsh::errors::{Error, Result, ResultExt};
use minsh::{LoopControl, MinshExitStatusExt, Shell, ShellConfig};
use nix::unistd::Pid;

const COMMAND_HISTORY_CAPACITY: usize = 10;
const LOG_FILE_NAME: &str = ".minsh_log";

const USAGE: &str = "
minsh.

Usage:
    minsh [options]
    minsh [options] -c <command>
    minsh [options] <file>
    minsh (-h | --help)
    minsh --version

Options:
    -h --help          Show this screen.
    --version          Show version.
    -c                 If the -c option is present, then the command is read from the first
                           non-option argument command.
    --log=<path>       File to write log to, defaults to ~/.minsh_log
    --prompt=<prompt>  Prompt printed before each line is read, defaults to \"minsh> \"
    --max-args=<n>     Maximum number of arguments per command, defaults to 64
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
    flag_prompt: Option<String>,
    flag_max_args: Option<usize>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(e) = init_logger(&args.flag_log) {
        eprintln!("minsh: logging disabled: {}", e);
    }
    debug!("{:?}", args);

    if args.flag_version {
        println!("minsh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin(&args);
    }
}

fn init_logger(path: &Option<String>) -> Result<()> {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => return Ok(()),
    };

    let pid = Pid::this();
    let log_file = fern::log_file(&log_path)
        .chain_err(|| format!("{}: cannot open log file", log_path.display()))?;
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(log_file)
        .apply()?;
    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn configure(config: ShellConfig, args: &Args) -> ShellConfig {
    let config = match args.flag_prompt {
        Some(ref prompt) => config.with_prompt(prompt.as_str()),
        None => config,
    };
    match args.flag_max_args {
        Some(max_args) => config.with_max_arguments(max_args),
        None => config,
    }
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let shell_config = configure(ShellConfig::noninteractive(), args);
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_command_string(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };

    match result {
        Ok(LoopControl::Exit) => shell.exit(Some(ExitStatus::from_success())),
        Ok(LoopControl::Continue) => shell.exit(None),
        Err(e) => {
            error!("fatal: {}", e);
            eprintln!("minsh: {}", e);
            shell.exit(Some(ExitStatus::from_failure()));
        }
    }
}

fn execute_from_stdin(args: &Args) -> ! {
    let shell_config = configure(ShellConfig::interactive(COMMAND_HISTORY_CAPACITY), args);
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));
    if let Err(e) = shell.execute_from_stdin() {
        error!("fatal: {}", e);
        eprintln!("minsh: {}", e);
        shell.exit(Some(ExitStatus::from_failure()));
    }
    shell.exit(Some(ExitStatus::from_success()))
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("minsh: {}", error);
    process::exit(ExitStatus::from_failure().code().unwrap_or(1));
}
