//! A small line-oriented command interpreter.
//!
//! Each line typed by the operator is split on a fixed set of delimiters and
//! either run in-process as a builtin (`cd`, `help`, `exit`) or launched as an
//! external program that the shell waits for before prompting again. There are
//! no pipelines, redirections, quoting or expansions.
//!
//! The main entry point is [`Shell`], which drives the loop over any
//! [`LineSource`]. The public modules [`command`], [`lexer`] and [`external`]
//! expose the pieces it is built from.

mod builtin;
pub mod command;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
mod reader;

pub use builtin::{Cd, Exit, Help, Registry};
pub use command::Continuation;
pub use error::{LaunchError, ShellError};
pub use interpreter::{DEFAULT_PROMPT, Shell};
pub use reader::{EditorReader, LineSource, StreamReader, read_raw_line};
