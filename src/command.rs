use crate::lexer::Tokens;
use std::io::{Result, Write};

/// What the command loop should do after a command has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Prompt for the next line.
    Continue,
    /// Stop the loop and exit the shell.
    Terminate,
}

/// Object-safe trait for anything the shell can dispatch a line to.
///
/// Implemented by the builtins through a blanket impl and by external commands.
/// `out` and `err` are the shell's own output and error streams; an `Err`
/// means one of them could not be written to.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, out: &mut dyn Write, err: &mut dyn Write) -> Result<Continuation>;
}

/// One entry of the builtin table: a name, a short description and a way to
/// build the command from a token sequence.
pub trait CommandFactory: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description shown by `help`.
    fn summary(&self) -> &'static str;

    /// Build the command for `tokens`, whose first token is [`Self::name`].
    fn create(&self, tokens: &Tokens<'_>) -> Box<dyn ExecutableCommand>;
}
