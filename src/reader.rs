//! Line acquisition.
//!
//! The command loop only talks to a [`LineSource`]. Two sources exist: a
//! [`StreamReader`] over any buffered byte stream, and an [`EditorReader`] for
//! interactive terminals.

use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Something that can show a prompt and hand back the next line of input.
pub trait LineSource {
    /// Shows `prompt` and blocks until a full line is available.
    ///
    /// Returns `Ok(None)` on a clean end of input. The returned line never
    /// contains its terminator.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        (**self).read_line(prompt)
    }
}

/// Plain reader: prompt goes to `writer`, lines come from `reader`.
pub struct StreamReader<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> LineSource for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        write!(self.writer, "{}", prompt).map_err(ShellError::Write)?;
        self.writer.flush().map_err(ShellError::Write)?;
        read_raw_line(&mut self.reader)
    }
}

/// Reads one line of unbounded length from `reader`.
///
/// The staging buffer grows with `try_reserve`, so an oversized line turns into
/// [`ShellError::Allocation`] instead of aborting. A final line without a
/// terminator is still returned; the call after it reports end of input.
pub fn read_raw_line(reader: &mut impl BufRead) -> Result<Option<String>, ShellError> {
    let mut buf: Vec<u8> = Vec::new();

    loop {
        let (used, terminated) = {
            let available = match reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ShellError::Read(e)),
            };
            if available.is_empty() {
                if buf.is_empty() {
                    return Ok(None);
                }
                break;
            }
            let (used, terminated) = match available.iter().position(|&b| b == b'\n') {
                Some(idx) => (idx + 1, true),
                None => (available.len(), false),
            };
            buf.try_reserve(used)?;
            buf.extend_from_slice(&available[..used]);
            (used, terminated)
        };
        reader.consume(used);
        if terminated {
            break;
        }
    }

    strip_terminator(&mut buf);
    Ok(Some(match String::from_utf8(buf) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }))
}

fn strip_terminator(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Interactive reader with line editing and in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self, ShellError> {
        let editor = DefaultEditor::new().map_err(editor_error)?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!(%err, "could not record history entry");
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the half-typed line; the loop sees a blank line.
            Err(ReadlineError::Interrupted) => {
                debug!("input line discarded");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(editor_error(err)),
        }
    }
}

fn editor_error(err: ReadlineError) -> ShellError {
    match err {
        ReadlineError::Io(e) => ShellError::Read(e),
        other => ShellError::Read(io::Error::other(other.to_string())),
    }
}
