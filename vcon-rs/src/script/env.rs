//! Session variable store.
//!
//! Named variables live in one flat table for the whole session.  Numeric
//! names (`1`, `2`, …) are reserved for positional parameters, which
//! resolve against the topmost frame of a separate stack; macro invocations
//! push a frame for their arguments and pop it when they return.
//!
//! Shadowing (`push_new` / `pop_new`) and frames
//! (`push_positional` / `pop_positional`) hand back the displaced state so
//! the caller can restore it; [`Evaluator`](super::Evaluator) wraps both in
//! closure-scoped helpers so restoration happens on every exit path.

use std::collections::HashMap;

use super::error::{EvalError, EvalResult};
use super::value::Value;

/// Previous binding returned by [`Environment::push_new`]; `None` = unset.
pub type Shadowed = Option<Value>;

/// Named variables plus the positional-parameter stack.
#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
    /// Active positional frame (`$1` is element 0).
    frame: Vec<Value>,
    /// Depth of the positional stack, for diagnostics.
    depth: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `name` unconditionally.
    pub fn set_new(&mut self, name: &str, value: Value) -> EvalResult<()> {
        check_name(name)?;
        self.vars.insert(name.to_owned(), value);
        Ok(())
    }

    /// Bind `name` to `value`, returning the binding it replaced.
    pub fn push_new(&mut self, name: &str, value: Value) -> EvalResult<Shadowed> {
        check_name(name)?;
        Ok(self.vars.insert(name.to_owned(), value))
    }

    /// Restore a binding returned by [`push_new`](Self::push_new).
    pub fn pop_new(&mut self, name: &str, old: Shadowed) -> EvalResult<()> {
        match old {
            Some(value) => self.set_new(name, value),
            None => {
                self.unset(name);
                Ok(())
            }
        }
    }

    /// Remove a named variable.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    /// Install `segment` as the positional frame, returning the previous one.
    pub fn push_positional(&mut self, segment: Vec<Value>) -> Vec<Value> {
        self.depth += 1;
        std::mem::replace(&mut self.frame, segment)
    }

    /// Reinstate a frame returned by [`push_positional`](Self::push_positional).
    pub fn pop_positional(&mut self, old: Vec<Value>) {
        self.depth = self.depth.saturating_sub(1);
        self.frame = old;
    }

    /// Number of frames pushed above the session's base frame.
    pub fn frame_depth(&self) -> usize {
        self.depth
    }

    /// The active positional parameters.
    pub fn positional(&self) -> &[Value] {
        &self.frame
    }

    /// Look up a variable.  Positive integer names index the positional
    /// frame; `None` means unset, which is distinct from `Some(&Value::Null)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match positional_index(name) {
            Some(n) => self.frame.get(n - 1),
            None => self.vars.get(name),
        }
    }

    /// All positional parameters (`1`…`N`) followed by the named variables
    /// in name order.
    pub fn list_content(&self) -> Vec<(String, Value)> {
        let mut out: Vec<(String, Value)> = self
            .frame
            .iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), v.clone()))
            .collect();
        let mut named: Vec<(&String, &Value)> = self.vars.iter().collect();
        named.sort_by_key(|(k, _)| k.as_str());
        out.extend(named.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

/// `Some(n)` if `name` is a positive integer (reserved for `$n`).
///
/// Overlong digit strings still count as positional; they just never
/// resolve to a parameter.
fn positional_index(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(name.parse().unwrap_or(usize::MAX))
}

/// `true` if `name` may be assigned (non-empty, not a positional index).
pub fn valid_name(name: &str) -> bool {
    check_name(name).is_ok()
}

fn check_name(name: &str) -> EvalResult<()> {
    if name.is_empty() || positional_index(name).is_some() {
        return Err(EvalError::BadName(name.to_owned()));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
