//! Evaluation errors.
//!
//! Errors come in two tiers.  Parse errors are raised by the tokenizer
//! before any handler runs for the command being read; execution errors are
//! raised by handlers (or by the dispatcher when nobody accepts a verb) and
//! propagate out of nested evaluations.  Session termination travels in the
//! same type so that it unwinds through macros and loops, but no wrapper
//! verb ever swallows it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the evaluator and handlers.
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    // ── Parse tier ────────────────────────────────────────────────────────────
    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("malformed variable reference: {0}")]
    BadVariable(&'static str),

    #[error("malformed escape sequence: {0}")]
    BadEscape(String),

    #[error("no verb in command")]
    NoVerb,

    #[error("missing filename after '<'")]
    MissingRedirect,

    #[error("cannot load {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ── Execution tier ────────────────────────────────────────────────────────
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{verb}: {message}")]
    Command { verb: String, message: String },

    #[error("invalid variable name {0:?}")]
    BadName(String),

    #[error("recursion limit ({0}) exceeded")]
    RecursionLimit(usize),

    #[error("input: {0}")]
    Io(#[from] io::Error),

    /// Request to end the session with the given status.
    #[error("session terminated (status {0})")]
    Exit(i32),
}

impl EvalError {
    /// Shorthand for a handler failure attributed to `verb`.
    pub fn command(verb: &str, message: impl Into<String>) -> Self {
        EvalError::Command { verb: verb.to_owned(), message: message.into() }
    }

    /// `true` for errors raised while reading and tokenizing a command.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            EvalError::UnterminatedQuote
                | EvalError::UnexpectedEof
                | EvalError::BadVariable(_)
                | EvalError::BadEscape(_)
                | EvalError::NoVerb
                | EvalError::MissingRedirect
                | EvalError::Redirect { .. }
        )
    }

    /// `true` when the error ends the session rather than the command.
    pub fn is_exit(&self) -> bool {
        matches!(self, EvalError::Exit(_))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_message_differs_from_quote_message() {
        assert_eq!(EvalError::UnexpectedEof.to_string(), "unexpected end of file");
        assert_ne!(
            EvalError::UnexpectedEof.to_string(),
            EvalError::UnterminatedQuote.to_string()
        );
    }

    #[test]
    fn tiers() {
        assert!(EvalError::NoVerb.is_parse_error());
        assert!(!EvalError::UnknownCommand("x".into()).is_parse_error());
        assert!(!EvalError::Exit(0).is_parse_error());
        assert!(EvalError::Exit(3).is_exit());
    }

    #[test]
    fn command_error_names_verb() {
        let e = EvalError::command("int_add", "not an integer: \"x\"");
        assert_eq!(e.to_string(), "int_add: not an integer: \"x\"");
    }
}
