//! The command-handler seam.
//!
//! A handler is offered every verb in turn and either declines (`None`) or
//! takes ownership of the invocation (`Some(result)`).  The evaluator keeps
//! handlers in priority order; the built-in chain is installed first and
//! service handlers are appended after it.

use super::aliases::LegacyAliases;
use super::args::Arguments;
use super::builtins::CoreCommands;
use super::convert::Conversions;
use super::error::EvalResult;
use super::eval::Evaluator;
use super::files::FileChecks;
use super::macros::MacroHandler;
use super::value::Value;

/// What a handled command produces: a value, or nothing.
pub type Reply = Option<Value>;

/// One link of the handler chain.
///
/// Handlers receive the evaluator so they can re-enter it (`if`, macros)
/// or reach the environment and terminal.  Interior state must not stay
/// borrowed across such a re-entry.
pub trait CommandHandler {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Handle `verb`, or return `None` to let the next handler try.
    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>>;
}

/// Adapts a closure into a [`CommandHandler`].
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&str, &mut Arguments, &mut Evaluator) -> Option<EvalResult<Reply>>,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&str, &mut Arguments, &mut Evaluator) -> Option<EvalResult<Reply>>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        (self.f)(verb, args, ev)
    }
}

/// Install the built-in chain: macros, core commands, legacy aliases,
/// scalar conversions, file checks.
pub(crate) fn install_builtins(ev: &mut Evaluator) {
    ev.add_handler(MacroHandler::default());
    ev.add_handler(CoreCommands);
    ev.add_handler(LegacyAliases);
    ev.add_handler(Conversions);
    ev.add_handler(FileChecks);
}
