//! Argument segments passed to command handlers.

use super::error::{EvalError, EvalResult};
use super::value::Value;

/// The arguments of one invocation: an owned segment of values plus a
/// window start.  Handlers consume leading arguments with [`shift`] and
/// look at the remainder through the window.
///
/// [`shift`]: Arguments::shift
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    segment: Vec<Value>,
    start: usize,
}

impl Arguments {
    pub fn new(segment: Vec<Value>) -> Self {
        Self { segment, start: 0 }
    }

    /// Build from plain strings (tests and service handlers).
    pub fn from_strs<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(items.into_iter().map(|s| Value::Str(s.into())).collect())
    }

    /// Number of arguments left in the window.
    pub fn len(&self) -> usize {
        self.segment.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `i`-th argument of the window.
    pub fn get(&self, i: usize) -> Option<&Value> {
        self.segment.get(self.start + i)
    }

    /// The window as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.segment[self.start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_slice().iter()
    }

    /// Remove the first argument of the window.
    pub fn shift(&mut self) -> Option<Value> {
        let slot = self.segment.get_mut(self.start)?;
        self.start += 1;
        Some(std::mem::take(slot))
    }

    /// Append a trailing argument (pipe input).
    pub fn push(&mut self, value: Value) {
        self.segment.push(value);
    }

    /// Consume into the values left in the window.
    pub fn into_vec(mut self) -> Vec<Value> {
        self.segment.drain(..self.start);
        self.segment
    }

    /// String renderings of the window joined by single spaces.
    pub fn joined(&self) -> String {
        self.iter().map(Value::to_string).collect::<Vec<_>>().join(" ")
    }

    /// Shift the next argument or fail with a usage message for `verb`.
    pub fn require(&mut self, verb: &str, usage: &str) -> EvalResult<Value> {
        self.shift()
            .ok_or_else(|| EvalError::command(verb, format!("usage: {verb} {usage}")))
    }

    /// Fail unless the window is exactly `n` arguments long.
    pub fn expect_len(&self, verb: &str, n: usize, usage: &str) -> EvalResult<()> {
        if self.len() == n {
            Ok(())
        } else {
            Err(EvalError::command(verb, format!("usage: {verb} {usage}")))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
