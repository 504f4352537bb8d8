//! File existence checks.

use std::fs;

use super::args::Arguments;
use super::error::{EvalError, EvalResult};
use super::eval::Evaluator;
use super::handler::{CommandHandler, Reply};
use super::value::Value;

/// Last link of the built-in chain: `exists`, `isfile`, `isdir`,
/// `filesize`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileChecks;

impl CommandHandler for FileChecks {
    fn name(&self) -> &'static str {
        "files"
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        _ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        if !matches!(verb, "exists" | "isfile" | "isdir" | "filesize") {
            return None;
        }
        Some(check(verb, args))
    }
}

fn check(verb: &str, args: &mut Arguments) -> EvalResult<Reply> {
    args.expect_len(verb, 1, "PATH")?;
    let path = args.require(verb, "PATH")?.to_string();
    let meta = fs::metadata(&path);
    let value = match verb {
        "exists" => Value::Bool(meta.is_ok()),
        "isfile" => Value::Bool(meta.is_ok_and(|m| m.is_file())),
        "isdir" => Value::Bool(meta.is_ok_and(|m| m.is_dir())),
        _ => {
            let meta = meta.map_err(|e| EvalError::command(verb, format!("{path}: {e}")))?;
            let size = i64::try_from(meta.len())
                .map_err(|_| EvalError::command(verb, format!("{path}: size out of range")))?;
            Value::Int(size)
        }
    };
    Ok(Some(value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
