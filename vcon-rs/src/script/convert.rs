//! Scalar conversions and arithmetic.
//!
//! Every word reaches a handler as a string, so these verbs are how scripts
//! obtain typed values: `int 3` is an integer, `float 2` is `2.0`, and the
//! `int_*` / `float_*` families operate on whatever their operands convert
//! to.  A non-numeric operand, a zero divisor or an overflow is an error.

use std::cmp::Ordering;

use super::args::Arguments;
use super::error::{EvalError, EvalResult};
use super::eval::Evaluator;
use super::handler::{CommandHandler, Reply};
use super::value::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct Conversions;

impl CommandHandler for Conversions {
    fn name(&self) -> &'static str {
        "conversions"
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        _ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        convert(verb, args).transpose()
    }
}

/// `Ok(None)` when `verb` is not a conversion.
fn convert(verb: &str, args: &mut Arguments) -> EvalResult<Option<Reply>> {
    let value = match verb {
        // ── Conversions ───────────────────────────────────────────────────────
        "int" => Value::Int(int_arg(verb, &unary(verb, args)?)?),
        "float" => Value::Float(float_arg(verb, &unary(verb, args)?)?),
        "bool" => Value::Bool(unary(verb, args)?.as_bool()),
        "str" => Value::Str(unary(verb, args)?.to_string()),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "not" => Value::Bool(!unary(verb, args)?.as_bool()),

        // ── Integer arithmetic ────────────────────────────────────────────────
        "int_add" | "int_sub" | "int_mul" | "int_div" | "int_mod" | "int_cmp" => {
            let (a, b) = binary(verb, args)?;
            let (a, b) = (int_arg(verb, &a)?, int_arg(verb, &b)?);
            if matches!(verb, "int_div" | "int_mod") && b == 0 {
                return Err(EvalError::command(verb, "division by zero"));
            }
            let result = match verb {
                "int_add" => a.checked_add(b),
                "int_sub" => a.checked_sub(b),
                "int_mul" => a.checked_mul(b),
                "int_div" => a.checked_div(b),
                "int_mod" => a.checked_rem(b),
                _ => Some(ordering(a.cmp(&b))),
            };
            Value::Int(result.ok_or_else(|| EvalError::command(verb, "integer overflow"))?)
        }

        // ── Float arithmetic ──────────────────────────────────────────────────
        "float_add" | "float_sub" | "float_mul" | "float_div" => {
            let (a, b) = binary(verb, args)?;
            let (a, b) = (float_arg(verb, &a)?, float_arg(verb, &b)?);
            Value::Float(match verb {
                "float_add" => a + b,
                "float_sub" => a - b,
                "float_mul" => a * b,
                _ => {
                    if b == 0.0 {
                        return Err(EvalError::command(verb, "division by zero"));
                    }
                    a / b
                }
            })
        }

        // ── Strings ───────────────────────────────────────────────────────────
        "eq" => {
            let (a, b) = binary(verb, args)?;
            Value::Bool(a.to_string() == b.to_string())
        }
        "strlen" => Value::Int(unary(verb, args)?.to_string().chars().count() as i64),
        "strcat" => Value::Str(args.iter().map(Value::to_string).collect()),

        _ => return Ok(None),
    };
    Ok(Some(Some(value)))
}

fn ordering(o: Ordering) -> i64 {
    match o {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn unary(verb: &str, args: &mut Arguments) -> EvalResult<Value> {
    args.expect_len(verb, 1, "VALUE")?;
    args.require(verb, "VALUE")
}

fn binary(verb: &str, args: &mut Arguments) -> EvalResult<(Value, Value)> {
    args.expect_len(verb, 2, "A B")?;
    Ok((args.require(verb, "A B")?, args.require(verb, "A B")?))
}

fn int_arg(verb: &str, v: &Value) -> EvalResult<i64> {
    v.to_int()
        .ok_or_else(|| EvalError::command(verb, format!("not an integer: {:?}", v.to_string())))
}

fn float_arg(verb: &str, v: &Value) -> EvalResult<f64> {
    v.to_float()
        .ok_or_else(|| EvalError::command(verb, format!("not a number: {:?}", v.to_string())))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn call(verb: &str, args: &[&str]) -> EvalResult<Value> {
        let mut args = Arguments::from_strs(args.iter().copied());
        convert(verb, &mut args)
            .map(|r| r.expect("not a conversion").expect("no value"))
    }

    fn ok(verb: &str, args: &[&str]) -> Value {
        call(verb, args).expect("conversion failed")
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(ok("int", &[" 42 "]), Value::Int(42));
        assert_eq!(ok("int", &["2.9"]), Value::Int(2));
        assert_eq!(ok("float", &["2"]), Value::Float(2.0));
        assert_eq!(ok("str", &["x"]), Value::Str("x".into()));
        assert_eq!(ok("true", &[]), Value::Bool(true));
        assert_eq!(ok("false", &[]), Value::Bool(false));
        assert!(call("int", &["abc"]).is_err());
        assert!(call("int", &[]).is_err());
        assert!(call("int", &["1", "2"]).is_err());
    }

    #[test]
    fn bool_and_not_test_emptiness() {
        for (word, expected) in [("", false), ("0", true), ("0.0", true), ("false", true)] {
            assert_eq!(ok("bool", &[word]), Value::Bool(expected), "{word:?}");
            assert_eq!(ok("not", &[word]), Value::Bool(!expected), "{word:?}");
        }
        assert_eq!(ok("bool", &["yes"]), Value::Bool(true));
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(ok("int_add", &["21", "21"]), Value::Int(42));
        assert_eq!(ok("int_sub", &["1", "3"]), Value::Int(-2));
        assert_eq!(ok("int_mul", &["6", "7"]), Value::Int(42));
        assert_eq!(ok("int_div", &["7", "2"]), Value::Int(3));
        assert_eq!(ok("int_mod", &["7", "2"]), Value::Int(1));
        assert_eq!(ok("int_cmp", &["1", "2"]), Value::Int(-1));
        assert_eq!(ok("int_cmp", &["2", "2"]), Value::Int(0));
    }

    #[test]
    fn integer_errors() {
        let err = call("int_add", &["x", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "int_add: not an integer: \"x\"");
        assert!(call("int_div", &["1", "0"]).is_err());
        assert!(call("int_mod", &["1", "0"]).is_err());
        assert!(call("int_add", &["9223372036854775807", "1"]).is_err());
        assert!(call("int_div", &["-9223372036854775808", "-1"]).is_err());
    }

    #[test]
    fn float_arithmetic() {
        assert_eq!(ok("float_add", &["1.5", "1"]), Value::Float(2.5));
        assert_eq!(ok("float_sub", &["1", "0.5"]), Value::Float(0.5));
        assert_eq!(ok("float_mul", &["2", "0.25"]), Value::Float(0.5));
        assert_eq!(ok("float_div", &["1", "4"]), Value::Float(0.25));
        assert!(call("float_div", &["1", "0"]).is_err());
        assert!(call("float_add", &["a", "1"]).is_err());
    }

    #[test]
    fn strings() {
        assert_eq!(ok("eq", &["a", "a"]), Value::Bool(true));
        assert_eq!(ok("eq", &["a", "b"]), Value::Bool(false));
        assert_eq!(ok("strlen", &["héllo"]), Value::Int(5));
        assert_eq!(ok("strcat", &["a", "b", "c"]), Value::Str("abc".into()));
        assert_eq!(ok("strcat", &[]), Value::Str(String::new()));
    }

    #[test]
    fn other_verbs_declined() {
        let mut args = Arguments::default();
        assert!(convert("echo", &mut args).unwrap().is_none());
    }
}
