use crate::command::{Continuation, ExecutableCommand};
use crate::error::LaunchError;
use crate::lexer::Tokens;
use std::io::{self, Write};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Command that is not a builtin.
///
/// Owns a copy of the argument vector, command name included as argument zero.
pub struct ExternalCommand {
    argv: Vec<String>,
}

impl ExternalCommand {
    pub fn new(tokens: &Tokens<'_>) -> Self {
        Self {
            argv: tokens.iter().map(str::to_owned).collect(),
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Runs the program to completion. Whatever happens to the child, the shell
    /// continues; launch failures are reported on `err`.
    fn execute(
        self: Box<Self>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<Continuation> {
        // Anything the shell already wrote must land before the child's output.
        out.flush()?;

        let argv: Vec<&str> = self.argv.iter().map(String::as_str).collect();
        if let Err(e) = launch(&argv) {
            writeln!(err, "lsh: {}", e)?;
        }
        Ok(Continuation::Continue)
    }
}

/// Spawns `argv[0]` with `argv` as its argument vector and waits for it to exit
/// or be killed by a signal.
///
/// The program is looked up in `PATH` when it has no path separator. The child
/// inherits the shell's standard streams. It is always reaped before this
/// returns; a child that is merely stopped does not end the wait.
pub fn launch(argv: &[&str]) -> Result<ExitStatus, LaunchError> {
    let (&program, args) = argv.split_first().ok_or(LaunchError::Empty)?;

    let mut child = Command::new(program)
        .args(args)
        .spawn()
        .map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound {
                program: program.to_string(),
            },
            _ => LaunchError::Spawn {
                program: program.to_string(),
                source,
            },
        })?;
    debug!(pid = child.id(), program = %program, "spawned child");

    let status = child.wait().map_err(|source| LaunchError::Wait {
        program: program.to_string(),
        source,
    })?;
    match status.code() {
        Some(code) => debug!(code, "child exited"),
        None => debug!(code = exit_code(status), "child terminated by signal"),
    }
    Ok(status)
}

/// Shell-style status code: the exit code, or 128 + signal number.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
