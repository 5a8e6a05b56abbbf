//! Lexical analysis (tokenization) of one command line.
//!
//! A token ends unconditionally at a delimiter. There is no quoting, escaping
//! or substitution: what the operator typed between delimiters is what the
//! command receives.

use crate::error::ShellError;

/// Characters that separate tokens: space, tab, carriage return, newline, bell.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Ordered, non-empty tokens borrowed from a command line.
///
/// The first token, if any, is the command name; the rest are its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens<'a> {
    words: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The command name.
    pub fn command(&self) -> Option<&'a str> {
        self.words.first().copied()
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.words.get(1..).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.words.iter().copied()
    }

    fn push(&mut self, word: &'a str) -> Result<(), ShellError> {
        // try_reserve keeps Vec's amortized doubling but reports failure.
        self.words.try_reserve(1)?;
        self.words.push(word);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    /// Byte offset where the current word began.
    ReadingWord(usize),
}

struct LexingFSM<'a> {
    input: &'a str,
    state: LexingState,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line,
            state: LexingState::Start,
        }
    }

    fn make_tokens(mut self) -> Result<Tokens<'a>, ShellError> {
        let mut out = Tokens::default();

        for (pos, ch) in self.input.char_indices() {
            match self.state {
                LexingState::Start => self.handle_start(pos, ch),
                LexingState::ReadingWord(start) => self.handle_word(start, pos, ch, &mut out)?,
            }
        }

        if let LexingState::ReadingWord(start) = self.state {
            out.push(&self.input[start..])?;
        }

        Ok(out)
    }

    fn handle_start(&mut self, pos: usize, ch: char) {
        if !is_delimiter(ch) {
            self.state = LexingState::ReadingWord(pos);
        }
    }

    fn handle_word(
        &mut self,
        start: usize,
        pos: usize,
        ch: char,
        out: &mut Tokens<'a>,
    ) -> Result<(), ShellError> {
        if is_delimiter(ch) {
            out.push(&self.input[start..pos])?;
            self.state = LexingState::Start;
        }
        Ok(())
    }
}

/// Splits `line` into tokens.
///
/// Runs of delimiters collapse into one separator, and leading or trailing
/// delimiters produce nothing, so a blank line yields no tokens at all.
pub fn split_into_tokens(line: &str) -> Result<Tokens<'_>, ShellError> {
    LexingFSM::new(line).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<&str> {
        split_into_tokens(line).unwrap().iter().collect()
    }

    #[test]
    fn test_empty_and_blank_lines_have_no_tokens() {
        for line in ["", " ", "\t\t", " \r\n ", "\x07", " \t\r\n\x07 "] {
            let tokens = split_into_tokens(line).unwrap();
            assert!(tokens.is_empty(), "expected no tokens for {:?}", line);
            assert_eq!(tokens.command(), None);
            assert!(tokens.args().is_empty());
        }
    }

    #[test]
    fn test_space_separated_words_keep_order() {
        assert_eq!(words("ls -l -a /tmp"), vec!["ls", "-l", "-a", "/tmp"]);
        assert_eq!(words("exit"), vec!["exit"]);
    }

    #[test]
    fn test_delimiter_runs_collapse() {
        assert_eq!(
            words("  grep\t\t-n  foo\x07bar \r\n"),
            vec!["grep", "-n", "foo", "bar"]
        );
    }

    #[test]
    fn test_no_quoting_or_escaping() {
        assert_eq!(
            words(r#"echo "a b" 'c' d\ e $HOME"#),
            vec!["echo", "\"a", "b\"", "'c'", "d\\", "e", "$HOME"]
        );
    }

    #[test]
    fn test_command_and_args() {
        let tokens = split_into_tokens("cd /var/log").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.command(), Some("cd"));
        assert_eq!(tokens.args(), &["/var/log"]);
        assert_eq!(tokens.iter().collect::<Vec<_>>(), vec!["cd", "/var/log"]);
    }

    #[test]
    fn test_multibyte_words() {
        assert_eq!(words("échо ✓\tдa"), vec!["échо", "✓", "дa"]);
    }

    #[test]
    fn test_single_very_long_token() {
        let long = "a".repeat(50_000);
        let tokens = split_into_tokens(&long).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.command(), Some(long.as_str()));
    }

    #[test]
    fn test_many_tokens() {
        let line = (0..5_000).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let tokens = split_into_tokens(&line).unwrap();
        assert_eq!(tokens.len(), 5_000);
        assert_eq!(tokens.command(), Some("0"));
        assert_eq!(tokens.args().last(), Some(&"4999"));
    }
}
