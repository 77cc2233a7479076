//! Launches a parsed command in a forked child and waits for it.
//!
//! The child performs output redirection and then replaces its image with
//! `execvp`; neither step is ever visible to the parent, which only waits on
//! the child's pid and collects its termination status.

use std::convert::Infallible;
use std::ffi::CString;
use std::io;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::errors::{ErrorKind, Result, ResultExt};
use crate::parse::ParsedCommand;

/// Exit status of a child whose program could not be found.
pub const COMMAND_NOT_FOUND_EXIT_STATUS: i32 = 127;
/// Exit status of a child whose program was found but could not be executed.
pub const COMMAND_NOT_EXECUTABLE_EXIT_STATUS: i32 = 126;
/// Exit status of a child whose redirect target could not be opened.
pub const REDIRECTION_FAILURE_EXIT_STATUS: i32 = 1;

const SIGNAL_EXIT_STATUS_BASE: i32 = 128;

/// The result of running one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildOutcome {
    /// Whether a child process was created.
    pub launched: bool,
    /// The child's exit status; `None` when no child was created.
    pub exit_status: Option<i32>,
}

impl ChildOutcome {
    /// The outcome of a command that never got a child process.
    pub fn not_launched() -> Self {
        ChildOutcome {
            launched: false,
            exit_status: None,
        }
    }

    /// The outcome of a child that terminated with `code`.
    pub fn completed(code: i32) -> Self {
        ChildOutcome {
            launched: true,
            exit_status: Some(code),
        }
    }

    /// Returns `true` if a child ran and exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

/// Runs `command` in a child process and blocks until that child terminates.
///
/// Failures that leave no child behind (empty program, unusable argument,
/// `fork` failure) are reported on stderr and yield
/// [`ChildOutcome::not_launched`]. A failing `waitpid` is returned as an
/// error because the shell can no longer account for its child.
pub fn launch(command: &ParsedCommand) -> Result<ChildOutcome> {
    let child = match spawn_child(command) {
        Ok(child) => child,
        Err(e) => {
            let recoverable = matches!(
                *e.kind(),
                ErrorKind::EmptyProgram | ErrorKind::InvalidArgument(_) | ErrorKind::Launch(_)
            );
            if !recoverable {
                return Err(e);
            }

            error!("failed to launch '{}': {}", command, e);
            eprintln!("minsh: {}", e);
            return Ok(ChildOutcome::not_launched());
        }
    };

    let code = child.wait()?;
    info!("[{}] '{}' exited with status {}", child.pid, command, code);
    Ok(ChildOutcome::completed(code))
}

/// A running child created by [`spawn_child`].
#[derive(Debug)]
struct Child {
    pid: Pid,
}

impl Child {
    /// Blocks until this specific child terminates and returns its exit status.
    ///
    /// A child killed by signal `n` reports `128 + n`.
    fn wait(&self) -> Result<i32> {
        loop {
            match wait::waitpid(self.pid, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(code),
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    return Ok(SIGNAL_EXIT_STATUS_BASE + signal as i32)
                }
                Ok(status) => debug!("ignoring wait status {:?}", status),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e).chain_err(|| ErrorKind::Wait(self.pid.as_raw())),
            }
        }
    }
}

/// Everything the child needs, prepared before forking so the child makes
/// no allocations between `fork` and `execvp` or `_exit`.
struct ChildImage {
    argv: Vec<CString>,
    output_target: Option<CString>,
    /// `minsh: <target>: cannot open for writing: `
    redirection_diagnostic: Vec<u8>,
    /// `minsh: <program>: failed to execute: `
    execution_diagnostic: Vec<u8>,
}

impl ChildImage {
    fn new(command: &ParsedCommand) -> Result<Self> {
        if command.program.is_empty() {
            return Err(ErrorKind::EmptyProgram.into());
        }

        let argv = command
            .argv()
            .into_iter()
            .map(to_cstring)
            .collect::<Result<Vec<_>>>()?;
        let output_target = command.output_target.as_deref().map(to_cstring).transpose()?;
        let redirection_diagnostic = match command.output_target {
            Some(ref target) => diagnostic_prefix(ErrorKind::Redirection(target.clone())),
            None => Vec::new(),
        };
        let execution_diagnostic =
            diagnostic_prefix(ErrorKind::Execution(command.program.clone()));

        Ok(ChildImage {
            argv,
            output_target,
            redirection_diagnostic,
            execution_diagnostic,
        })
    }

    fn program(&self) -> String {
        self.argv[0].to_string_lossy().into_owned()
    }

    /// Restores default `SIGPIPE` handling, redirects stdout if requested,
    /// then replaces the process image.
    ///
    /// Only returns on failure.
    fn exec(&self) -> ::std::result::Result<Infallible, ChildFailure> {
        // Rust starts with SIGPIPE ignored and that disposition survives execvp.
        unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }
            .map_err(ChildFailure::Execution)?;

        if let Some(ref target) = self.output_target {
            redirect_stdout(target).map_err(ChildFailure::Redirection)?;
        }

        unistd::execvp(&self.argv[0], &self.argv).map_err(ChildFailure::Execution)
    }

    /// Writes the one-line diagnostic for `failure` to stderr without allocating.
    fn report(&self, failure: ChildFailure) {
        let prefix = match failure {
            ChildFailure::Redirection(_) => &self.redirection_diagnostic,
            ChildFailure::Execution(_) => &self.execution_diagnostic,
        };
        for part in &[prefix.as_slice(), failure.errno().desc().as_bytes(), &b"\n"[..]] {
            let _ = unistd::write(io::stderr(), part);
        }
    }
}

fn diagnostic_prefix(kind: ErrorKind) -> Vec<u8> {
    format!("minsh: {}: ", kind).into_bytes()
}

fn to_cstring(arg: &str) -> Result<CString> {
    CString::new(arg).chain_err(|| ErrorKind::InvalidArgument(arg.to_string()))
}

fn redirect_stdout(target: &CString) -> nix::Result<()> {
    let fd = fcntl::open(
        target.as_c_str(),
        OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        Mode::from_bits_truncate(0o666),
    )?;
    if fd != libc::STDOUT_FILENO {
        unistd::dup2(fd, libc::STDOUT_FILENO)?;
        unistd::close(fd)?;
    }
    Ok(())
}

/// Why a child terminated without running its program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChildFailure {
    Redirection(Errno),
    Execution(Errno),
}

impl ChildFailure {
    fn exit_status(self) -> i32 {
        match self {
            ChildFailure::Redirection(_) => REDIRECTION_FAILURE_EXIT_STATUS,
            ChildFailure::Execution(Errno::ENOENT) => COMMAND_NOT_FOUND_EXIT_STATUS,
            ChildFailure::Execution(_) => COMMAND_NOT_EXECUTABLE_EXIT_STATUS,
        }
    }

    fn errno(self) -> Errno {
        match self {
            ChildFailure::Redirection(errno) | ChildFailure::Execution(errno) => errno,
        }
    }
}

/// Forks a child that runs `command`.
///
/// In the child this never returns: it either becomes the program or exits
/// with a non-zero status after writing a diagnostic to stderr.
fn spawn_child(command: &ParsedCommand) -> Result<Child> {
    let image = ChildImage::new(command)?;

    match unsafe { unistd::fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("forked child {} for '{}'", child, command);
            Ok(Child { pid: child })
        }
        Ok(ForkResult::Child) => {
            let failure = match image.exec() {
                Ok(never) => match never {},
                Err(failure) => failure,
            };
            image.report(failure);
            unsafe { libc::_exit(failure.exit_status()) }
        }
        Err(e) => Err(e).chain_err(|| ErrorKind::Launch(image.program())),
    }
}
