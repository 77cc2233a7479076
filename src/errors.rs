//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

#![allow(deprecated, missing_docs)]

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Nix(::nix::Error);
        Readline(::rustyline::error::ReadlineError);
        Logger(::log::SetLoggerError);
    }

    errors {
        /// The input line contained no tokens.
        EmptyCommand {
            description("empty command")
            display("empty command")
        }

        /// Generic syntax error containing the offending line.
        Syntax(line: String) {
            description("syntax error")
            display("syntax error near: {}", line)
        }

        TooManyArguments(limit: usize) {
            description("too many arguments")
            display("too many arguments (limit is {})", limit)
        }

        EmptyProgram {
            description("no program to execute")
            display("no program to execute")
        }

        /// An argument cannot be passed to `execvp` because it holds a NUL byte.
        InvalidArgument(arg: String) {
            description("invalid argument")
            display("{:?}: argument contains a NUL byte", arg)
        }

        /// `fork` failed; no child exists.
        Launch(program: String) {
            description("failed to create child process")
            display("{}: failed to create child process", program)
        }

        /// Reported by the child when `execvp` fails.
        Execution(program: String) {
            description("failed to execute program")
            display("{}: failed to execute", program)
        }

        /// Reported by the child when the redirect target cannot be opened.
        Redirection(target: String) {
            description("failed to open redirect target")
            display("{}: cannot open for writing", target)
        }

        Wait(pid: i32) {
            description("failed to wait for child process")
            display("failed to wait for child process ({})", pid)
        }

        HistoryFile {
            description("history file could not be loaded")
            display("history file could not be loaded")
        }
    }
}
