//! The evaluator: session state plus the handler chain.
//!
//! An [`Evaluator`] owns the [`Environment`], the ordered list of
//! [`CommandHandler`]s and the [`Terminal`].  Callers feed it one logical
//! command at a time with [`consume`](Evaluator::consume); handlers for
//! control structures and macros call back into
//! [`evaluate_string`](Evaluator::evaluate_string) on the same evaluator,
//! so nested evaluation shares one environment and one call stack.

use std::rc::Rc;

use super::args::Arguments;
use super::env::Environment;
use super::error::{EvalError, EvalResult};
use super::handler::{self, CommandHandler, Reply};
use super::lexer;
use super::value::Value;
use crate::config::Config;
use crate::input::{LineSource, StrSource};
use crate::terminal::Terminal;

/// Nesting limit used when no configuration says otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Outcome of consuming one logical command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Input is exhausted.
    Eof,
    /// The line held only whitespace or a comment.
    Blank,
    /// A command ran; its result, if it produced one.
    Done(Reply),
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

pub struct Evaluator {
    env: Environment,
    handlers: Vec<Rc<dyn CommandHandler>>,
    terminal: Box<dyn Terminal>,
    depth: usize,
    max_depth: usize,
    /// The latest result came from `silent` and is not to be printed.
    silenced: bool,
}

impl Evaluator {
    /// An evaluator with the built-in handler chain installed.
    pub fn new(terminal: Box<dyn Terminal>) -> Self {
        let mut ev = Self::bare(terminal);
        handler::install_builtins(&mut ev);
        ev
    }

    /// Built-in chain plus the limits from `config`.
    pub fn with_config(terminal: Box<dyn Terminal>, config: &Config) -> Self {
        let mut ev = Self::new(terminal);
        ev.set_max_depth(config.max_depth);
        ev
    }

    /// An evaluator with an empty handler chain.
    pub fn bare(terminal: Box<dyn Terminal>) -> Self {
        Self {
            env: Environment::new(),
            handlers: Vec::new(),
            terminal,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            silenced: false,
        }
    }

    /// Append a handler; it is consulted after every handler already added.
    pub fn add_handler(&mut self, handler: impl CommandHandler + 'static) {
        tracing::debug!(handler = handler.name(), "handler added");
        self.handlers.push(Rc::new(handler));
    }

    /// Names of the installed handlers, in priority order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn terminal(&mut self) -> &mut dyn Terminal {
        self.terminal.as_mut()
    }

    /// Mark the result of the current invocation as not for printing.
    pub fn silence_result(&mut self) {
        self.silenced = true;
    }

    /// Whether the last result was marked by
    /// [`silence_result`](Self::silence_result); clears the mark.
    pub fn take_silenced(&mut self) -> bool {
        std::mem::take(&mut self.silenced)
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    /// Read and run one logical command from `input`.
    pub fn consume(&mut self, input: &mut dyn LineSource) -> EvalResult<Step> {
        lexer::read_command(self, input)
    }

    /// Run every command in `text`; the result is that of the last command
    /// (blank lines do not reset it).
    pub fn evaluate_string(&mut self, text: &str) -> EvalResult<Reply> {
        if self.depth >= self.max_depth {
            return Err(EvalError::RecursionLimit(self.max_depth));
        }
        self.depth += 1;
        let result = self.run_all(text);
        self.depth -= 1;
        result
    }

    /// [`evaluate_string`](Self::evaluate_string) coerced to a boolean; no
    /// result is `false`.
    pub fn evaluate_string_to_bool(&mut self, text: &str) -> EvalResult<bool> {
        Ok(self.evaluate_string(text)?.is_some_and(|v| v.as_bool()))
    }

    fn run_all(&mut self, text: &str) -> EvalResult<Reply> {
        let mut input = StrSource::new(text);
        let mut last = None;
        loop {
            match self.consume(&mut input)? {
                Step::Eof => return Ok(last),
                Step::Blank => {}
                Step::Done(reply) => last = reply,
            }
        }
    }

    /// Offer `verb` to each handler in order; the first that accepts it
    /// produces the result.
    pub fn invoke(&mut self, verb: &str, mut args: Arguments) -> EvalResult<Reply> {
        tracing::debug!(verb, argc = args.len(), "dispatch");
        self.silenced = false;
        for i in 0..self.handlers.len() {
            let handler = Rc::clone(&self.handlers[i]);
            if let Some(result) = handler.call(verb, &mut args, self) {
                return result;
            }
        }
        Err(EvalError::UnknownCommand(verb.to_owned()))
    }

    // ── Scoped environment changes ────────────────────────────────────────────

    /// Run `f` with `frame` as the positional parameters, restoring the
    /// previous frame afterwards whatever `f` returns.
    pub fn with_positional<T>(
        &mut self,
        frame: Vec<Value>,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let old = self.env.push_positional(frame);
        let result = f(self);
        self.env.pop_positional(old);
        result
    }

    /// Run `f` with `name` bound to `value`, restoring the previous binding
    /// (or its absence) afterwards whatever `f` returns.
    pub fn with_binding<T>(
        &mut self,
        name: &str,
        value: Value,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let old = self.env.push_new(name, value)?;
        let result = f(self);
        self.env.pop_new(name, old)?;
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::handler::FnHandler;
    use crate::terminal::CaptureTerminal;

    fn evaluator() -> Evaluator {
        let (term, _) = CaptureTerminal::new();
        Evaluator::new(Box::new(term))
    }

    #[test]
    fn builtin_chain_order() {
        let ev = evaluator();
        assert_eq!(
            ev.handler_names(),
            vec!["macros", "core", "aliases", "conversions", "files"]
        );
    }

    #[test]
    fn unknown_verb() {
        let mut ev = evaluator();
        let err = ev.evaluate_string("frobnicate x").unwrap_err();
        assert_eq!(err.to_string(), "unknown command: frobnicate");
    }

    #[test]
    fn empty_chain_accepts_nothing() {
        let (term, _) = CaptureTerminal::new();
        let mut ev = Evaluator::bare(Box::new(term));
        assert!(matches!(
            ev.invoke("echo", Arguments::default()),
            Err(EvalError::UnknownCommand(_))
        ));
    }

    #[test]
    fn evaluate_string_returns_last_result() {
        let mut ev = evaluator();
        let v = ev.evaluate_string("list a\n\nint_add 1 2\n# done\n").unwrap();
        assert_eq!(v, Some(Value::Int(3)));
        assert_eq!(ev.evaluate_string("").unwrap(), None);
    }

    #[test]
    fn evaluate_to_bool() {
        let mut ev = evaluator();
        assert!(ev.evaluate_string_to_bool("int 3").unwrap());
        assert!(!ev.evaluate_string_to_bool("int 0").unwrap());
        assert!(!ev.evaluate_string_to_bool("echo hi").unwrap());
        assert!(ev.evaluate_string_to_bool("list").unwrap());
    }

    #[test]
    fn service_handlers_run_after_builtins() {
        let mut ev = evaluator();
        ev.add_handler(FnHandler::new("svc", |verb: &str, _: &mut Arguments, _: &mut Evaluator| {
            match verb {
                "echo" | "ping" => Some(Ok(Some(Value::from("pong")))),
                _ => None,
            }
        }));
        assert_eq!(ev.evaluate_string("ping").unwrap(), Some("pong".into()));
        // `echo` is claimed by the core handler first.
        assert_eq!(ev.evaluate_string("echo x").unwrap(), None);
    }

    #[test]
    fn recursion_limit() {
        let mut ev = evaluator();
        ev.set_max_depth(20);
        ev.evaluate_string("macro loop {loop}").unwrap();
        let err = ev.evaluate_string("loop").unwrap_err();
        assert!(matches!(err, EvalError::RecursionLimit(20)));
        assert_eq!(ev.env().frame_depth(), 0);
        // The depth counter unwound with the error.
        assert_eq!(ev.evaluate_string("int 1").unwrap(), Some(Value::Int(1)));
    }

    #[test]
    fn with_binding_restores_on_error() {
        let mut ev = evaluator();
        ev.env_mut().set_new("v", "outer".into()).unwrap();
        let r: EvalResult<()> = ev.with_binding("v", "inner".into(), |ev| {
            assert_eq!(ev.env().get("v"), Some(&"inner".into()));
            Err(EvalError::command("t", "boom"))
        });
        assert!(r.is_err());
        assert_eq!(ev.env().get("v"), Some(&"outer".into()));
    }

    #[test]
    fn with_positional_restores_on_error() {
        let mut ev = evaluator();
        let r = ev.with_positional(vec!["a".into()], |ev| ev.evaluate_string("nosuchverb $1"));
        assert!(r.is_err());
        assert_eq!(ev.env().get("1"), None);
        assert_eq!(ev.env().frame_depth(), 0);
    }

    #[test]
    fn config_sets_depth() {
        let (term, _) = CaptureTerminal::new();
        let config = Config { max_depth: 7, ..Config::default() };
        let ev = Evaluator::with_config(Box::new(term), &config);
        assert_eq!(ev.max_depth(), 7);
    }
}
