use crate::builtin::Registry;
use crate::command::{Continuation, ExecutableCommand};
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::lexer::{Tokens, split_into_tokens};
use crate::reader::LineSource;
use std::io::Write;
use tracing::{debug, trace};

pub const DEFAULT_PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Stopped,
}

/// The interactive command loop.
///
/// Each turn shows the prompt, reads a line from the [`LineSource`], splits it
/// into tokens and hands it either to a builtin from the [`Registry`] or to an
/// external program. Builtin output goes to `out`, every diagnostic to `err`.
///
/// Example
/// ```
/// use lsh::{Shell, StreamReader};
/// use std::io::Cursor;
///
/// let (mut prompts, mut out, mut err) = (Vec::new(), Vec::new(), Vec::new());
/// let source = StreamReader::new(Cursor::new(b"help\nexit\n".to_vec()), &mut prompts);
/// Shell::new(source, &mut out, &mut err).run().unwrap();
/// assert!(String::from_utf8(out).unwrap().contains("exit"));
/// ```
pub struct Shell<S: LineSource, O: Write, E: Write> {
    source: S,
    out: O,
    err: E,
    prompt: String,
    registry: &'static Registry,
}

impl<S: LineSource, O: Write, E: Write> Shell<S, O, E> {
    /// Create a shell over the process-wide builtin table with the default prompt.
    pub fn new(source: S, out: O, err: E) -> Self {
        Self {
            source,
            out,
            err,
            prompt: DEFAULT_PROMPT.to_string(),
            registry: Registry::builtins(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Loop until `exit` or end of input.
    ///
    /// Only unrecoverable conditions (allocation, reading input, writing to the
    /// terminal) come back as `Err`; everything else is reported and the loop goes on.
    pub fn run(&mut self) -> Result<(), ShellError> {
        let mut state = State::Running;

        while state == State::Running {
            let Some(line) = self.source.read_line(&self.prompt)? else {
                debug!("end of input");
                break;
            };

            if self.execute_line(&line)? == Continuation::Terminate {
                state = State::Stopped;
            }
        }

        Ok(())
    }

    /// Tokenize and dispatch one line. A blank line does nothing.
    pub fn execute_line(&mut self, line: &str) -> Result<Continuation, ShellError> {
        let tokens = split_into_tokens(line)?;
        trace!(count = tokens.len(), "tokenized line");

        if tokens.is_empty() {
            return Ok(Continuation::Continue);
        }
        self.dispatch(&tokens)
    }

    /// Run `tokens` as a builtin when the first token names one, otherwise as
    /// an external program.
    pub fn dispatch(&mut self, tokens: &Tokens<'_>) -> Result<Continuation, ShellError> {
        let Some(name) = tokens.command() else {
            return Ok(Continuation::Continue);
        };

        let cmd: Box<dyn ExecutableCommand> = match self.registry.lookup(name) {
            Some(factory) => {
                debug!(name, "dispatching builtin");
                factory.create(tokens)
            }
            None => {
                debug!(name, argc = tokens.len(), "launching external program");
                Box::new(ExternalCommand::new(tokens))
            }
        };

        cmd.execute(&mut self.out, &mut self.err)
            .map_err(ShellError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::StreamReader;
    use crate::test_support::lock_current_dir;
    use std::io::{self, BufReader, Cursor};

    struct Transcript {
        prompts: String,
        out: String,
        err: String,
    }

    fn session(input: &str) -> Transcript {
        let mut prompts = Vec::new();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let source = StreamReader::new(Cursor::new(input.as_bytes().to_vec()), &mut prompts);
        Shell::new(source, &mut out, &mut err).run().unwrap();

        Transcript {
            prompts: String::from_utf8(prompts).unwrap(),
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let t = session("\n   \n\t\x07\r\n");

        assert_eq!(t.prompts, "> > > > ");
        assert!(t.out.is_empty());
        assert!(t.err.is_empty());
    }

    #[test]
    fn test_exit_stops_prompting() {
        let t = session("help\nexit\nhelp\n");

        assert_eq!(t.prompts, "> > ");
        assert_eq!(t.out.matches("LSH\n").count(), 1);
        assert!(t.err.is_empty());
    }

    #[test]
    fn test_end_of_input_stops_cleanly() {
        let t = session("help");

        assert_eq!(t.prompts, "> > ");
        assert!(t.out.contains("cd"));
    }

    #[test]
    fn test_missing_program_keeps_looping() {
        let t = session("lsh-definitely-not-a-program a b\nhelp\nexit\n");

        assert_eq!(
            t.err,
            "lsh: lsh-definitely-not-a-program: command not found\n"
        );
        assert!(t.out.contains("LSH"));
        assert_eq!(t.prompts, "> > > ");
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_program_keeps_looping() {
        let t = session("false\nsh -c false\nexit\n");

        assert!(t.err.is_empty(), "{:?}", t.err);
        assert_eq!(t.prompts, "> > > ");
    }

    #[test]
    fn test_cd_usage_error_keeps_looping() {
        let _lock = lock_current_dir();
        let t = session("cd\nexit\n");

        assert_eq!(t.err, "lsh: expected argument to \"cd\"\n");
        assert_eq!(t.prompts, "> > ");
    }

    #[test]
    fn test_custom_prompt() {
        let mut prompts = Vec::new();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let source = StreamReader::new(Cursor::new(b"exit\n".to_vec()), &mut prompts);
        Shell::new(source, &mut out, &mut err)
            .with_prompt("$ ")
            .run()
            .unwrap();

        assert_eq!(String::from_utf8(prompts).unwrap(), "$ ");
    }

    #[test]
    fn test_execute_line_returns_continuation() {
        let source = StreamReader::new(Cursor::new(Vec::new()), io::sink());
        let mut shell = Shell::new(source, io::sink(), io::sink());

        assert_eq!(shell.execute_line("").unwrap(), Continuation::Continue);
        assert_eq!(shell.execute_line("help").unwrap(), Continuation::Continue);
        assert_eq!(shell.execute_line("  exit now ").unwrap(), Continuation::Terminate);
    }

    #[test]
    fn test_read_failure_is_fatal() {
        struct Broken;

        impl io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device gone"))
            }
        }

        let source = StreamReader::new(BufReader::new(Broken), io::sink());
        let mut shell = Shell::new(source, io::sink(), io::sink());

        assert!(matches!(shell.run(), Err(ShellError::Read(_))));
    }
}
