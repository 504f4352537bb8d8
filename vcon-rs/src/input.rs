//! Physical-line input sources.
//!
//! The evaluator pulls one line at a time: the first line of a command,
//! then further lines only while a brace literal is still open.  Line
//! terminators (`\n`, `\r\n`) are stripped before the tokenizer sees a
//! line.

use std::io::{self, BufRead};

/// A source of physical input lines.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// `true` when a person is typing, so prompts should be shown.
    fn is_interactive(&self) -> bool {
        false
    }
}

// ── StrSource ─────────────────────────────────────────────────────────────────

/// Lines of an in-memory string (macro bodies, `eval`, `-c`).
#[derive(Debug)]
pub struct StrSource<'a> {
    rest: Option<&'a str>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: Some(text) }
    }
}

impl LineSource for StrSource<'_> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let Some(rest) = self.rest else { return Ok(None) };
        if rest.is_empty() {
            self.rest = None;
            return Ok(None);
        }
        let (line, tail) = match rest.split_once('\n') {
            Some((line, tail)) => (line, Some(tail)),
            None => (rest, None),
        };
        self.rest = tail;
        Ok(Some(strip_cr(line).to_owned()))
    }
}

// ── ReaderSource ──────────────────────────────────────────────────────────────

/// Lines from any buffered reader (stdin, script files).
pub struct ReaderSource<R> {
    reader: R,
    interactive: bool,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, interactive: false }
    }

    /// Mark the source as typed by a person (prompts are shown).
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        if buf.ends_with('\n') {
            buf.pop();
        }
        if buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(src: &mut dyn LineSource) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = src.read_line().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn str_source_splits_lines() {
        let mut src = StrSource::new("one\r\ntwo\n\nfour");
        assert_eq!(drain(&mut src), vec!["one", "two", "", "four"]);
    }

    #[test]
    fn str_source_trailing_newline_adds_no_line() {
        let mut src = StrSource::new("one\n");
        assert_eq!(drain(&mut src), vec!["one"]);
        let mut empty = StrSource::new("");
        assert!(drain(&mut empty).is_empty());
    }

    #[test]
    fn reader_source_strips_terminators() {
        let data = b"alpha\r\nbeta\ngamma" as &[u8];
        let mut src = ReaderSource::new(data);
        assert!(!src.is_interactive());
        assert_eq!(drain(&mut src), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn reader_source_interactive_flag() {
        let src = ReaderSource::new(&b""[..]).interactive(true);
        assert!(src.is_interactive());
    }
}
