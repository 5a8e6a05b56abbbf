use crate::command::{CommandFactory, Continuation, ExecutableCommand};
use crate::lexer::Tokens;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::sync::OnceLock;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs + 'static {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// One-line description listed by `help`.
    fn summary() -> &'static str;

    /// Build the command from its arguments (command name excluded).
    fn parse(args: &[&str]) -> Result<Self, EarlyExit> {
        Self::from_args(&[Self::name()], args)
    }

    /// Executes the command, writing any regular output to `out`.
    ///
    /// An `Err` is reported on the error stream and the shell keeps going.
    fn execute(self, out: &mut dyn Write) -> Result<Continuation>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<Continuation> {
        match <T as BuiltinCommand>::execute(*self, out) {
            Ok(next) => Ok(next),
            Err(e) => {
                writeln!(err, "lsh: {:#}", e)?;
                Ok(Continuation::Continue)
            }
        }
    }
}

/// Arguments that argh refused, or a request for `--help`.
struct InvalidArgs {
    name: &'static str,
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<Continuation> {
        if self.is_error {
            writeln!(err, "lsh: {}: {}", self.name, self.output.trim_end())?;
        } else {
            out.write_all(self.output.as_bytes())?;
        }
        Ok(Continuation::Continue)
    }
}

/// Table entry for the builtin `T`.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn summary(&self) -> &'static str {
        T::summary()
    }

    fn create(&self, tokens: &Tokens<'_>) -> Box<dyn ExecutableCommand> {
        match T::parse(tokens.args()) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                name: T::name(),
                output,
                is_error: status.is_err(),
            }),
        }
    }
}

/// Immutable table of builtins, looked up by name and listed in registration order.
pub struct Registry {
    entries: Vec<Box<dyn CommandFactory>>,
}

impl Registry {
    fn new(entries: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { entries }
    }

    /// The process-wide table, built on first use and never changed afterwards.
    pub fn builtins() -> &'static Registry {
        static BUILTINS: OnceLock<Registry> = OnceLock::new();
        BUILTINS.get_or_init(Registry::default)
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.entries
            .iter()
            .find(|entry| entry.name() == name)
            .map(|entry| entry.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CommandFactory> + '_ {
        self.entries.iter().map(|entry| entry.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name())
    }
}

impl Default for Registry {
    /// `cd`, `help` and `exit`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Exit>::default()),
        ])
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "change the working directory"
    }

    // The target is taken literally, so `-x` or `help` are directory names.
    fn parse(args: &[&str]) -> Result<Self, EarlyExit> {
        match args {
            [] => Ok(Cd { target: None }),
            [target] => Ok(Cd {
                target: Some(target.to_string()),
            }),
            _ => Err(EarlyExit {
                output: "too many arguments".to_string(),
                status: Err(()),
            }),
        }
    }

    fn execute(self, _out: &mut dyn Write) -> Result<Continuation> {
        let target = self
            .target
            .ok_or_else(|| anyhow!("expected argument to \"cd\""))?;

        env::set_current_dir(&target).with_context(|| format!("cd: {}", target))?;
        debug!(dir = %target, "changed directory");
        Ok(Continuation::Continue)
    }
}

#[derive(FromArgs)]
/// Show the builtin commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "show this help"
    }

    // Arguments are ignored.
    fn parse(_args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Help {})
    }

    fn execute(self, out: &mut dyn Write) -> Result<Continuation> {
        writeln!(out, "LSH")?;
        writeln!(out, "Type program names and arguments, and hit enter.")?;
        writeln!(out, "The following are built in:")?;
        for entry in Registry::builtins().iter() {
            writeln!(out, "  {:<6} {}", entry.name(), entry.summary())?;
        }
        writeln!(out, "Use the man command for information on other programs.")?;
        Ok(Continuation::Continue)
    }
}

#[derive(FromArgs)]
/// Exit shell process.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn summary() -> &'static str {
        "leave the shell"
    }

    // Arguments are ignored, `--help` included.
    fn parse(_args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Exit {})
    }

    fn execute(self, _out: &mut dyn Write) -> Result<Continuation> {
        Ok(Continuation::Terminate)
    }
}
