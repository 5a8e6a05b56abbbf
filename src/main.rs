use argh::FromArgs;
use lsh::{DEFAULT_PROMPT, EditorReader, LineSource, Shell, ShellError, StreamReader};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A minimal interactive shell.
struct Options {
    /// prompt shown before each line
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    prompt: String,

    /// read plain lines from stdin even when it is a terminal
    #[argh(switch)]
    no_editor: bool,

    /// log dispatch decisions to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let options: Options = argh::from_env();
    init_tracing(options.verbose);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lsh: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> Result<(), ShellError> {
    let stdin = io::stdin();
    let source: Box<dyn LineSource> = if stdin.is_terminal() && !options.no_editor {
        Box::new(EditorReader::new()?)
    } else {
        Box::new(StreamReader::new(stdin.lock(), io::stdout()))
    };

    Shell::new(source, io::stdout(), io::stderr())
        .with_prompt(options.prompt.as_str())
        .run()
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
