//! Runtime value type for the command language.
//!
//! Every word the tokenizer produces is a string, but handlers return
//! structured results (numbers, lists, maps) that flow between commands
//! through variables and pipes.  Values are immutable once produced;
//! "changing" a variable stores a new value.

use std::collections::BTreeMap;
use std::fmt;

/// A command-language runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                // Whole floats keep one fractional digit so they read back as floats.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

impl Value {
    /// Coerce to boolean.  Null, numeric zero, `false` and the empty string
    /// are falsy; everything else is truthy, including the strings `"0"`
    /// and `"false"` and empty lists and maps.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    /// Interpret as an integer.  Strings are parsed (surrounding whitespace
    /// ignored); floats are truncated; null and containers have no integer
    /// reading.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(x) if x.is_finite() => Some(*x as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|x| x.is_finite()).map(|x| x as i64))
            }
            _ => None,
        }
    }

    /// Interpret as a float.
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Number of elements for containers, characters otherwise.
    pub fn len(&self) -> usize {
        match self {
            Value::List(items) => items.len(),
            Value::Map(entries) => entries.len(),
            other => other.to_string().chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Pipe flattening ───────────────────────────────────────────────────────

    /// Convert into plain-text tokens for the next command of a pipe.
    ///
    /// Scalars yield one token, lists one token per element, maps nothing,
    /// and null a single empty token.
    pub fn flatten(&self) -> Vec<String> {
        match self {
            Value::List(items) => items.iter().map(Value::to_string).collect(),
            Value::Map(_) => Vec::new(),
            other => vec![other.to_string()],
        }
    }
}

/// Flatten a command result for the next pipe stage.
///
/// A command that produced nothing (`echo`, `setenv`) pipes nothing, so
/// `echo x | list` receives no extra argument.  A null value is a result
/// and keeps its position as one empty argument.
pub fn flatten_reply(reply: Option<&Value>) -> Vec<String> {
    reply.map(Value::flatten).unwrap_or_default()
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(3.25).to_string(), "3.25");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Str("hello".into()).to_string(), "hello");
    }

    #[test]
    fn display_containers() {
        let list = Value::List(vec![Value::Int(1), "two".into(), Value::Null]);
        assert_eq!(list.to_string(), "1 two ");
        let mut m = BTreeMap::new();
        m.insert("b".to_owned(), Value::Int(2));
        m.insert("a".to_owned(), Value::Int(1));
        assert_eq!(Value::Map(m).to_string(), "a=1 b=2");
    }

    #[test]
    fn as_bool() {
        assert!(!Value::Null.as_bool());
        assert!(!Value::Int(0).as_bool());
        assert!(!Value::Float(0.0).as_bool());
        assert!(!Value::Str(String::new()).as_bool());
        assert!(!Value::Bool(false).as_bool());
        assert!(Value::Str("0".into()).as_bool());
        assert!(Value::Str("0.0".into()).as_bool());
        assert!(Value::Str("false".into()).as_bool());
        assert!(Value::Str("  ".into()).as_bool());
        assert!(Value::Str("no".into()).as_bool());
        assert!(Value::Int(-1).as_bool());
        assert!(Value::List(Vec::new()).as_bool());
        assert!(Value::Map(BTreeMap::new()).as_bool());
    }

    #[test]
    fn to_int_coercions() {
        assert_eq!(Value::Int(5).to_int(), Some(5));
        assert_eq!(Value::Float(3.9).to_int(), Some(3));
        assert_eq!(Value::Str(" 42 ".into()).to_int(), Some(42));
        assert_eq!(Value::Str("2.5".into()).to_int(), Some(2));
        assert_eq!(Value::Str("abc".into()).to_int(), None);
        assert_eq!(Value::Null.to_int(), None);
        assert_eq!(Value::List(vec![]).to_int(), None);
    }

    #[test]
    fn flatten_rules() {
        assert_eq!(Value::Int(7).flatten(), vec!["7"]);
        assert_eq!(Value::Null.flatten(), vec![""]);
        assert!(Value::List(Vec::new()).flatten().is_empty());
        assert_eq!(
            Value::List(vec!["a".into(), "b".into()]).flatten(),
            vec!["a", "b"]
        );
        let mut m = BTreeMap::new();
        m.insert("k".to_owned(), Value::Int(1));
        assert!(Value::Map(m).flatten().is_empty());
        assert!(flatten_reply(None).is_empty());
    }

    #[test]
    fn len_counts_chars_for_scalars() {
        assert_eq!(Value::Str("héllo".into()).len(), 5);
        assert_eq!(Value::List(vec![Value::Null, Value::Null]).len(), 2);
        assert_eq!(Value::Int(1234).len(), 4);
    }
}
