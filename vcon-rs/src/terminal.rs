//! Terminal sink: where messages, errors, prompts and results go.
//!
//! The evaluator never writes to stdout directly; everything user-visible
//! passes through a [`Terminal`].  Two implementations are provided:
//!
//! * [`ConsoleTerminal`] writes through crossterm, colouring errors when
//!   the error stream is a TTY.
//! * [`CaptureTerminal`] records every event in a shared [`Transcript`],
//!   which is how tests (and embedders) observe a session.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    tty::IsTty,
};

use crate::config::Config;
use crate::script::Value;

// ── Terminal contract ─────────────────────────────────────────────────────────

/// Which prompt the console wants shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Waiting for a new command.
    Primary,
    /// Waiting for the rest of an open brace literal.
    Continuation,
}

/// Output sink for one session.  Writes are best-effort.
pub trait Terminal {
    /// An informational line (`echo`, diagnostics, listings).
    fn message(&mut self, text: &str);

    /// An error report.
    fn error(&mut self, text: &str);

    /// Show a prompt without ending the line.
    fn prompt(&mut self, kind: PromptKind);

    /// The value returned by a top-level command.
    fn result(&mut self, value: &Value) {
        self.message(&value.to_string());
    }
}

// ── ConsoleTerminal ───────────────────────────────────────────────────────────

/// Crossterm-backed terminal over stdout/stderr (or any pair of writers).
pub struct ConsoleTerminal {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    color: bool,
    prompt: String,
    continuation_prompt: String,
}

impl ConsoleTerminal {
    /// Write to arbitrary streams with default prompts and no colour.
    pub fn new(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        let defaults = Config::default();
        Self {
            out: Box::new(out),
            err: Box::new(err),
            color: false,
            prompt: defaults.prompt,
            continuation_prompt: defaults.continuation_prompt,
        }
    }

    /// The process's stdout/stderr, configured from `config`.
    pub fn stdio(config: &Config) -> Self {
        let color = config.color && io::stderr().is_tty();
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            color,
            prompt: config.prompt.clone(),
            continuation_prompt: config.continuation_prompt.clone(),
        }
    }

    fn write_error(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            queue!(
                self.err,
                SetForegroundColor(Color::Red),
                Print(text),
                ResetColor,
                Print("\n")
            )?;
        } else {
            queue!(self.err, Print(text), Print("\n"))?;
        }
        self.err.flush()
    }
}

impl Terminal for ConsoleTerminal {
    fn message(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn error(&mut self, text: &str) {
        let _ = self.write_error(text);
    }

    fn prompt(&mut self, kind: PromptKind) {
        let text = match kind {
            PromptKind::Primary => &self.prompt,
            PromptKind::Continuation => &self.continuation_prompt,
        };
        let _ = queue!(self.out, Print(text));
        let _ = self.out.flush();
    }
}

// ── CaptureTerminal ───────────────────────────────────────────────────────────

/// One recorded terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message(String),
    Error(String),
    Prompt(PromptKind),
    Result(Value),
}

/// Shared handle onto the events recorded by a [`CaptureTerminal`].
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<Event>>>);

impl Transcript {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Text of every `message` event, in order.
    pub fn messages(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Message(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<Value> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Result(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }
}

/// Terminal that records instead of printing.
#[derive(Debug, Default)]
pub struct CaptureTerminal {
    transcript: Transcript,
}

impl CaptureTerminal {
    /// A fresh terminal plus the handle used to read what it recorded.
    pub fn new() -> (Self, Transcript) {
        let transcript = Transcript::default();
        (Self { transcript: transcript.clone() }, transcript)
    }
}

impl Terminal for CaptureTerminal {
    fn message(&mut self, text: &str) {
        self.transcript.push(Event::Message(text.to_owned()));
    }

    fn error(&mut self, text: &str) {
        self.transcript.push(Event::Error(text.to_owned()));
    }

    fn prompt(&mut self, kind: PromptKind) {
        self.transcript.push(Event::Prompt(kind));
    }

    fn result(&mut self, value: &Value) {
        self.transcript.push(Event::Result(value.clone()));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A `Write` that appends into a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[test]
    fn console_routes_streams() {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let mut term = ConsoleTerminal::new(out.clone(), err.clone());
        term.message("hello");
        term.result(&Value::Int(42));
        term.error("boom");
        term.prompt(PromptKind::Primary);
        assert_eq!(out.text(), "hello\n42\n> ");
        assert_eq!(err.text(), "boom\n");
    }

    #[test]
    fn console_continuation_prompt() {
        let out = SharedBuf::default();
        let mut term = ConsoleTerminal::new(out.clone(), io::sink());
        term.prompt(PromptKind::Continuation);
        assert_eq!(out.text(), "... ");
    }

    #[test]
    fn capture_records_in_order() {
        let (mut term, transcript) = CaptureTerminal::new();
        term.message("a");
        term.error("b");
        term.result(&Value::Int(1));
        term.prompt(PromptKind::Continuation);
        assert_eq!(
            transcript.events(),
            vec![
                Event::Message("a".into()),
                Event::Error("b".into()),
                Event::Result(Value::Int(1)),
                Event::Prompt(PromptKind::Continuation),
            ]
        );
        assert_eq!(transcript.messages(), vec!["a"]);
        assert_eq!(transcript.errors(), vec!["b"]);
        transcript.clear();
        assert!(transcript.events().is_empty());
    }
}
