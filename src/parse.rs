//! Minsh Parser
//!
//! Splits an input line on spaces into a program, its arguments and an
//! optional output redirection target.

use std::fmt;

use crate::errors::{ErrorKind, Result};

/// Default upper bound on the number of arguments a command may carry.
pub const DEFAULT_MAX_ARGUMENTS: usize = 64;

const REDIRECT_OUTPUT_TOKEN: &str = ">";
const QUOTE: char = '"';

/// A single command parsed from one line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The program to execute, as a path or a name looked up in `PATH`.
    pub program: String,
    /// The arguments to the program, excluding the program itself.
    pub args: Vec<String>,
    /// The file to write stdout to, if one is specified.
    pub output_target: Option<String>,
}

impl ParsedCommand {
    /// Parses an input line, accepting up to [`DEFAULT_MAX_ARGUMENTS`] arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use minsh::parse::{ParsedCommand, ParsedCommandBuilder};
    ///
    /// let command = ParsedCommand::parse("echo test > out.txt").unwrap();
    /// let mut expected = ParsedCommandBuilder::new("echo");
    /// expected.arg("test").output_target("out.txt");
    /// assert_eq!(command, expected.build());
    /// ```
    pub fn parse(input: &str) -> Result<ParsedCommand> {
        Self::parse_with_limit(input, DEFAULT_MAX_ARGUMENTS)
    }

    /// Parses an input line, rejecting commands with more than `max_arguments` arguments.
    pub fn parse_with_limit(input: &str, max_arguments: usize) -> Result<ParsedCommand> {
        let mut tokens = input.split(' ').filter(|token| !token.is_empty());
        let program = tokens.next().ok_or(ErrorKind::EmptyCommand)?;
        let mut command = ParsedCommandBuilder::new(program);

        let mut redirected = false;
        while let Some(token) = tokens.next() {
            if token == REDIRECT_OUTPUT_TOKEN {
                if redirected {
                    return Err(ErrorKind::Syntax(input.to_string()).into());
                }
                let target = tokens
                    .next()
                    .ok_or_else(|| ErrorKind::Syntax(input.to_string()))?;
                command.output_target(target);
                redirected = true;
            } else {
                if command.args.len() == max_arguments {
                    return Err(ErrorKind::TooManyArguments(max_arguments).into());
                }
                command.arg(token);
            }
        }

        command.strip_wrapping_quotes();
        let command = command.build();
        debug!("parsed command: {:?}", command);
        Ok(command)
    }

    /// The argument vector handed to the program: the program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.as_str());
        argv.extend(self.args.iter().map(String::as_str));
        argv
    }
}

impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))?;
        if let Some(ref target) = self.output_target {
            write!(f, " > {}", target)?;
        }
        Ok(())
    }
}

/// Builds [`ParsedCommand`]s.
#[derive(Clone, Debug)]
pub struct ParsedCommandBuilder {
    program: String,
    args: Vec<String>,
    output_target: Option<String>,
}

impl ParsedCommandBuilder {
    /// Initializes a new `ParsedCommandBuilder` with the given program, no
    /// arguments and no redirection.
    pub fn new(program: &str) -> ParsedCommandBuilder {
        ParsedCommandBuilder {
            program: String::from(program),
            args: Vec::new(),
            output_target: None,
        }
    }

    /// Add an argument to pass to the program.
    pub fn arg(&mut self, arg: &str) -> &mut ParsedCommandBuilder {
        self.args.push(String::from(arg));
        self
    }

    /// Add arguments to pass to the program.
    pub fn args(&mut self, args: &[&str]) -> &mut ParsedCommandBuilder {
        self.args.extend(args.iter().map(|x| (*x).to_owned()));
        self
    }

    /// Redirect stdout to `filename`.
    pub fn output_target(&mut self, filename: &str) -> &mut ParsedCommandBuilder {
        self.output_target = Some(String::from(filename));
        self
    }

    /// Removes a `"` opening the first argument and a `"` closing the last one.
    ///
    /// Quotes wrap the whole argument list, not individual arguments, so
    /// `"hello world"` becomes the two arguments `hello` and `world`.
    fn strip_wrapping_quotes(&mut self) {
        let wrapped = match (self.args.first(), self.args.last()) {
            (Some(first), Some(last)) => {
                let long_enough = self.args.len() > 1 || first.len() >= 2;
                long_enough && first.starts_with(QUOTE) && last.ends_with(QUOTE)
            }
            _ => false,
        };
        if !wrapped {
            return;
        }

        // The last quote goes first so a single argument keeps a valid index.
        if let Some(last) = self.args.last_mut() {
            last.pop();
        }
        if let Some(first) = self.args.first_mut() {
            first.remove(0);
        }
    }

    /// Consumes the builder to build a [`ParsedCommand`].
    pub fn build(self) -> ParsedCommand {
        ParsedCommand {
            program: self.program,
            args: self.args,
            output_target: self.output_target,
        }
    }
}
