//! Legacy verb spellings.
//!
//! Older scripts use the short names below.  Each alias is re-dispatched
//! through the whole chain, so a macro named like the target verb still
//! takes precedence over the built-in.

use super::args::Arguments;
use super::error::EvalResult;
use super::eval::Evaluator;
use super::handler::{CommandHandler, Reply};

/// `(alias, target)` pairs.
const ALIASES: &[(&str, &str)] = &[
    ("set", "setenv"),
    ("unset", "unsetenv"),
    ("print", "echo"),
    ("for", "foreach"),
    ("def", "macro"),
    ("undef", "unmacro"),
];

/// Resolve a legacy alias to the verb it stands for.
pub fn target(verb: &str) -> Option<&'static str> {
    ALIASES.iter().find(|(alias, _)| *alias == verb).map(|(_, target)| *target)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyAliases;

impl CommandHandler for LegacyAliases {
    fn name(&self) -> &'static str {
        "aliases"
    }

    fn call(
        &self,
        verb: &str,
        args: &mut Arguments,
        ev: &mut Evaluator,
    ) -> Option<EvalResult<Reply>> {
        let target = target(verb)?;
        Some(ev.invoke(target, std::mem::take(args)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
