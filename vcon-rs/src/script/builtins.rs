//! Fundamental control and variable commands.
//!
//! | Verb       | Arguments                                   | Result          |
//! |------------|---------------------------------------------|-----------------|
//! | `if`       | `COND CODE [elsif COND CODE]… [else CODE]`  | chosen branch   |
//! | `foreach`  | `VAR BODY ITEM…`                            | none            |
//! | `setenv`   | `NAME [VALUE…]`                             | none            |
//! | `getenv`   | `NAME`                                      | value, or none  |
//! | `unsetenv` | `NAME`                                      | none            |
//! | `env`      |                                             | none            |
//! | `echo`     | `ARGS…`                                     | none            |
//! | `eval`     | `TEXT…`                                     | last command    |
//! | `source`   | `FILE [ARGS…]`                              | last command    |
//! | `list`     | `ITEM…`                                     | list            |
//! | `map`      | `KEY VALUE…`                                | map             |
//! | `len`      | `VALUE`                                     | integer         |
//! | `fatal`    | `VERB ARGS…`                                | VERB's result   |
//! | `noerror`  | `VERB ARGS…`                                | VERB's result   |
//! | `silent`   | `VERB ARGS…`                                | VERB's result   |
//! | `exit`     | `[STATUS]`                                  | ends session    |

use std::collections::BTreeMap;

use super::args::Arguments;
use super::env::valid_name;
use super::error::{EvalError, EvalResult};
use super::eval::Evaluator;
use super::handler::{CommandHandler, Reply};
use super::value::Value;

/// Second link of the built-in chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreCommands;

impl CommandHandler for CoreCommands {
    fn name(&self) -> &'static str {
        "core"
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        Some(match verb {
            // ── Control ───────────────────────────────────────────────────────
            "if" => cmd_if(args, ev),
            "foreach" => cmd_foreach(args, ev),
            "eval" => ev.evaluate_string(&args.joined()),
            "source" => cmd_source(args, ev),

            // ── Variables ─────────────────────────────────────────────────────
            "setenv" => cmd_setenv(args, ev),
            "getenv" => args
                .require(verb, "NAME")
                .map(|name| ev.env().get(&name.to_string()).cloned()),
            "unsetenv" => args.require(verb, "NAME").map(|name| {
                ev.env_mut().unset(&name.to_string());
                None
            }),
            "env" => {
                for (name, value) in ev.env().list_content() {
                    ev.terminal().message(&format!("{name}={value}"));
                }
                Ok(None)
            }

            // ── Output and values ─────────────────────────────────────────────
            "echo" => {
                ev.terminal().message(&args.joined());
                Ok(None)
            }
            "list" => Ok(Some(Value::List(std::mem::take(args).into_vec()))),
            "map" => cmd_map(args),
            "len" => args
                .require(verb, "VALUE")
                .map(|v| Some(Value::Int(v.len() as i64))),

            // ── Error policy wrappers ─────────────────────────────────────────
            "fatal" => cmd_fatal(args, ev),
            "noerror" => match wrapped(verb, args, ev) {
                Err(e) if !e.is_exit() => {
                    tracing::debug!(error = %e, "noerror: error swallowed");
                    Ok(None)
                }
                other => other,
            },
            "silent" => match wrapped(verb, args, ev) {
                Ok(reply) => {
                    ev.silence_result();
                    Ok(reply)
                }
                Err(e) => Err(e),
            },
            "exit" => cmd_exit(args),

            _ => return None,
        })
    }
}

// ── Control ───────────────────────────────────────────────────────────────────

/// One `if` arm: `None` condition for `else`.
struct Clause {
    cond: Option<String>,
    code: String,
}

fn parse_if(args: &mut Arguments) -> EvalResult<Vec<Clause>> {
    let usage =
        || EvalError::command("if", "usage: if COND CODE [elsif COND CODE]… [else CODE]");
    let cond = args.shift().ok_or_else(usage)?.to_string();
    let code = args.shift().ok_or_else(usage)?.to_string();
    let mut clauses = vec![Clause { cond: Some(cond), code }];
    while let Some(keyword) = args.shift() {
        match keyword.to_string().as_str() {
            "elsif" => {
                let cond = args.require("if", "… elsif COND CODE")?.to_string();
                let code = args.require("if", "… elsif COND CODE")?.to_string();
                clauses.push(Clause { cond: Some(cond), code });
            }
            "else" => {
                let code = args.require("if", "… else CODE")?.to_string();
                clauses.push(Clause { cond: None, code });
                if !args.is_empty() {
                    return Err(EvalError::command("if", "arguments after else clause"));
                }
            }
            other => {
                return Err(EvalError::command("if", format!("unknown keyword {other:?}")));
            }
        }
    }
    Ok(clauses)
}

fn cmd_if(args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    // The whole clause list is checked before any condition runs.
    for clause in parse_if(args)? {
        let taken = match &clause.cond {
            Some(cond) => ev.evaluate_string_to_bool(cond)?,
            None => true,
        };
        if taken {
            return ev.evaluate_string(&clause.code);
        }
    }
    Ok(None)
}

fn cmd_foreach(args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    let name = args.require("foreach", "VAR BODY ITEM…")?.to_string();
    let body = args.require("foreach", "VAR BODY ITEM…")?.to_string();
    if !valid_name(&name) {
        return Err(EvalError::BadName(name));
    }
    for item in std::mem::take(args).into_vec() {
        ev.with_binding(&name, item, |ev| ev.evaluate_string(&body))?;
    }
    Ok(None)
}

fn cmd_source(args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    let path = args.require("source", "FILE [ARGS…]")?.to_string();
    let bytes = std::fs::read(&path)
        .map_err(|e| EvalError::command("source", format!("cannot read {path}: {e}")))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!(path, bytes = bytes.len(), "sourcing file");
    let frame = std::mem::take(args).into_vec();
    ev.with_positional(frame, |ev| ev.evaluate_string(&text))
}

// ── Variables and values ──────────────────────────────────────────────────────

fn cmd_setenv(args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    let name = args.require("setenv", "NAME [VALUE…]")?.to_string();
    let mut values = std::mem::take(args).into_vec();
    let value = match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::List(values),
    };
    ev.env_mut().set_new(&name, value)?;
    Ok(None)
}

fn cmd_map(args: &mut Arguments) -> EvalResult<Reply> {
    if args.len() % 2 != 0 {
        return Err(EvalError::command("map", "odd number of arguments"));
    }
    let mut map = BTreeMap::new();
    while let (Some(key), Some(value)) = (args.shift(), args.shift()) {
        map.insert(key.to_string(), value);
    }
    Ok(Some(Value::Map(map)))
}

// ── Error policy ──────────────────────────────────────────────────────────────

/// Run the command named by the wrapper's first argument.
fn wrapped(wrapper: &str, args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    let verb = args.require(wrapper, "VERB [ARGS…]")?.to_string();
    ev.invoke(&verb, std::mem::take(args))
}

fn cmd_fatal(args: &mut Arguments, ev: &mut Evaluator) -> EvalResult<Reply> {
    match wrapped("fatal", args, ev) {
        Err(e) if !e.is_exit() => {
            ev.terminal().error(&e.to_string());
            Err(EvalError::Exit(1))
        }
        other => other,
    }
}

fn cmd_exit(args: &mut Arguments) -> EvalResult<Reply> {
    let status = match args.shift() {
        None => 0,
        Some(v) => {
            let n = v
                .to_int()
                .ok_or_else(|| EvalError::command("exit", format!("not a status: {v}")))?;
            i32::try_from(n)
                .map_err(|_| EvalError::command("exit", format!("status out of range: {n}")))?
        }
    };
    Err(EvalError::Exit(status))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
