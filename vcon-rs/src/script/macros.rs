//! User-defined macros.
//!
//! `macro NAME BODY` records BODY as text.  Invoking NAME evaluates the
//! body with the invocation's arguments as the positional frame, so `$1`
//! inside the body is the first argument of that call only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::args::Arguments;
use super::error::{EvalError, EvalResult};
use super::eval::Evaluator;
use super::handler::{CommandHandler, Reply};
use super::value::Value;

/// Verbs owned by this handler, which therefore cannot name a macro.
const RESERVED: &[&str] = &["macro", "unmacro"];

/// The macro table.  Highest-priority handler in the built-in chain, so a
/// macro may shadow any other verb.
#[derive(Debug, Default)]
pub struct MacroHandler {
    table: RefCell<HashMap<String, Rc<str>>>,
}

impl MacroHandler {
    fn define(&self, args: &mut Arguments) -> EvalResult<Reply> {
        let Some(name) = args.shift().map(|v| v.to_string()) else {
            let mut names: Vec<String> = self.table.borrow().keys().cloned().collect();
            names.sort();
            return Ok(Some(Value::List(names.into_iter().map(Value::Str).collect())));
        };
        let Some(body) = args.shift() else {
            let body = self.body(&name).ok_or_else(|| no_such_macro("macro", &name))?;
            return Ok(Some(Value::Str(body.to_string())));
        };
        if !args.is_empty() {
            return Err(EvalError::command("macro", "usage: macro [NAME [BODY]]"));
        }
        if name.is_empty() || RESERVED.contains(&name.as_str()) {
            return Err(EvalError::command("macro", format!("cannot define {name:?}")));
        }
        tracing::debug!(name, "macro defined");
        self.table.borrow_mut().insert(name, body.to_string().into());
        Ok(None)
    }

    fn remove(&self, args: &mut Arguments) -> EvalResult<Reply> {
        let name = args.require("unmacro", "NAME")?.to_string();
        if self.table.borrow_mut().remove(&name).is_none() {
            return Err(no_such_macro("unmacro", &name));
        }
        Ok(None)
    }

    fn body(&self, name: &str) -> Option<Rc<str>> {
        self.table.borrow().get(name).cloned()
    }
}

fn no_such_macro(verb: &str, name: &str) -> EvalError {
    EvalError::command(verb, format!("no such macro: {name}"))
}

impl CommandHandler for MacroHandler {
    fn name(&self) -> &'static str {
        "macros"
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        match verb {
            "macro" => Some(self.define(args)),
            "unmacro" => Some(self.remove(args)),
            _ => {
                // The table borrow ends here; the body may redefine macros.
                let body = self.body(verb)?;
                let frame = std::mem::take(args).into_vec();
                Some(ev.with_positional(frame, |ev| ev.evaluate_string(&body)))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
