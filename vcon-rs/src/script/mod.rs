//! The command language.
//!
//! One logical command is a line of words, optionally continued over
//! several physical lines by an open `{…}` literal.  The first word is the
//! verb; the [`Evaluator`] offers it to an ordered chain of
//! [`CommandHandler`]s and the first handler that accepts it runs.
//!
//! Built-in chain, highest priority first:
//!
//! - [`macros`]: `macro`, `unmacro` and invocation of user macros
//! - [`builtins`]: control flow, variables, values and error-policy wrappers
//! - [`aliases`]: legacy spellings (`set`, `print`, `def`, …)
//! - [`convert`]: scalar conversions and arithmetic
//! - [`files`]: file existence checks
//!
//! Service handlers added with [`Evaluator::add_handler`] run after these.
//!
//! # Quick start
//!
//! ```rust
//! use vcon::script::{Evaluator, Value};
//! use vcon::terminal::CaptureTerminal;
//!
//! let (term, transcript) = CaptureTerminal::new();
//! let mut ev = Evaluator::new(Box::new(term));
//! ev.evaluate_string("macro double {int_add $1 $1}").unwrap();
//! assert_eq!(ev.evaluate_string("double 21").unwrap(), Some(Value::Int(42)));
//! ev.evaluate_string("foreach i {echo $i} x y").unwrap();
//! assert_eq!(transcript.messages(), vec!["x", "y"]);
//! ```

pub mod aliases;
pub mod args;
pub mod builtins;
pub mod convert;
pub mod env;
pub mod error;
pub mod eval;
pub mod files;
pub mod handler;
pub mod lexer;
pub mod macros;
pub mod value;

// Re-exports for convenience.
pub use args::Arguments;
pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use eval::{Evaluator, Step, DEFAULT_MAX_DEPTH};
pub use handler::{CommandHandler, FnHandler, Reply};
pub use lexer::quote;
pub use value::{flatten_reply, Value};
