use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;

use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::{DefaultHistory, History},
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::{ErrorKind, Result, ResultExt};

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

enum Source {
    /// A terminal, driven by rustyline with history and filename completion.
    Terminal(Box<rustyline::Editor<EditorHelper, DefaultHistory>>),
    /// Any other line source, e.g. a pipe. The prompt is written to stdout
    /// when `echo_prompt` is set.
    Reader {
        reader: Box<dyn BufRead>,
        echo_prompt: bool,
    },
}

/// Source of input lines for the shell.
pub struct Editor {
    source: Source,
}

impl Editor {
    /// Creates a line editor for an interactive terminal.
    pub fn with_capacity(history_capacity: usize) -> Result<Editor> {
        let config = Config::builder()
            .max_history_size(history_capacity)?
            .history_ignore_space(true)
            .completion_type(CompletionType::Circular)
            .build();

        let mut internal = rustyline::Editor::with_config(config)?;
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));

        Ok(Editor {
            source: Source::Terminal(Box::new(internal)),
        })
    }

    /// Reads lines from `reader`, printing the prompt to stdout before each
    /// read when `echo_prompt` is `true`.
    pub fn from_reader(reader: Box<dyn BufRead>, echo_prompt: bool) -> Editor {
        Editor {
            source: Source::Reader {
                reader,
                echo_prompt,
            },
        }
    }

    /// Reads lines from standard input.
    pub fn from_stdin(echo_prompt: bool) -> Editor {
        Self::from_reader(Box::new(io::BufReader::new(io::stdin())), echo_prompt)
    }

    /// Returns `true` if this editor reads from a terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self.source, Source::Terminal(_))
    }

    /// Reads one line without its line terminator.
    /// Returns `None` when end of file is reached.
    ///
    /// Bytes that are not valid UTF-8 are replaced with `U+FFFD`.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.source {
            Source::Terminal(ref mut internal) => loop {
                match internal.readline(prompt) {
                    Ok(line) => return Ok(Some(line)),
                    Err(ReadlineError::Eof) => return Ok(None),
                    Err(ReadlineError::Interrupted) => continue,
                    Err(e) => return Err(e.into()),
                }
            },
            Source::Reader {
                ref mut reader,
                echo_prompt,
            } => {
                if echo_prompt {
                    let mut stdout = io::stdout();
                    stdout.write_all(prompt.as_bytes())?;
                    stdout.flush()?;
                }

                let mut bytes = Vec::new();
                if reader.read_until(b'\n', &mut bytes)? == 0 {
                    return Ok(None);
                }
                let mut line = String::from_utf8_lossy(&bytes).into_owned();
                strip_line_terminator(&mut line);
                Ok(Some(line))
            }
        }
    }

    pub fn load_history<P: AsRef<Path> + ?Sized>(&mut self, path: &P) -> Result<()> {
        if let Source::Terminal(ref mut internal) = self.source {
            match internal.load_history(path) {
                Ok(()) => {}
                Err(ReadlineError::Io(ref inner)) if inner.kind() == io::ErrorKind::NotFound => {
                    debug!("no history file at {}", path.as_ref().display());
                }
                Err(e) => return Err(e).chain_err(|| ErrorKind::HistoryFile),
            }
        }

        Ok(())
    }

    pub fn save_history<P: AsRef<Path> + ?Sized>(&mut self, path: &P) -> Result<()> {
        if let Source::Terminal(ref mut internal) = self.source {
            internal.save_history(path)?;
        }

        Ok(())
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if let Source::Terminal(ref mut internal) = self.source {
            let temp_result = internal.add_history_entry(line);
            log_if_err!(temp_result, "add_history_entry");
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Terminal(ref internal) => {
                write!(f, "Editor {{ terminal, {} history entries }}", internal.history().len())
            }
            Source::Reader { echo_prompt, .. } => {
                write!(f, "Editor {{ reader, echo_prompt: {} }}", echo_prompt)
            }
        }
    }
}

fn strip_line_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_editor(input: &'static str) -> Editor {
        Editor::from_reader(Box::new(Cursor::new(input)), false)
    }

    #[test]
    fn test_readline_strips_terminators() {
        let mut editor = reader_editor("echo a\r\necho b\nlast");
        assert_eq!(editor.readline("> ").unwrap(), Some("echo a".to_string()));
        assert_eq!(editor.readline("> ").unwrap(), Some("echo b".to_string()));
        assert_eq!(editor.readline("> ").unwrap(), Some("last".to_string()));
        assert_eq!(editor.readline("> ").unwrap(), None);
    }

    #[test]
    fn test_readline_keeps_other_whitespace() {
        let mut editor = reader_editor(" exit \n\n");
        assert_eq!(editor.readline("> ").unwrap(), Some(" exit ".to_string()));
        assert_eq!(editor.readline("> ").unwrap(), Some(String::new()));
        assert_eq!(editor.readline("> ").unwrap(), None);
    }

    #[test]
    fn test_readline_replaces_invalid_utf8() {
        let input = Cursor::new(&b"echo \xff\ntrue\n"[..]);
        let mut editor = Editor::from_reader(Box::new(input), false);
        assert_eq!(
            editor.readline("> ").unwrap(),
            Some("echo \u{FFFD}".to_string())
        );
        assert_eq!(editor.readline("> ").unwrap(), Some("true".to_string()));
    }

    #[test]
    fn test_history_is_noop_for_readers() {
        let mut editor = reader_editor("");
        assert!(!editor.is_terminal());
        editor.add_history_entry("echo a");
        assert!(editor.load_history("/nonexistent/minsh_history").is_ok());
    }
}
