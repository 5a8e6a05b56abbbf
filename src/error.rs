//! Error types for lsh.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Failures that end the whole shell process.
///
/// Everything else (usage errors, failing builtins, programs that cannot be
/// launched) is reported where it happens and the loop keeps going.
#[derive(Error, Debug)]
pub enum ShellError {
    /// An internal buffer could not grow.
    #[error("allocation error")]
    Allocation(#[from] TryReserveError),

    /// Reading from the input stream failed for a reason other than end of input.
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// The output stream went away.
    #[error("write error: {0}")]
    Write(#[source] io::Error),
}

/// Why an external program could not be run to completion.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("nothing to launch")]
    Empty,

    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program}: failed to wait for child: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}
