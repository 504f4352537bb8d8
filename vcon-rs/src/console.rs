//! Read-evaluate-print loop.
//!
//! Drives an [`Evaluator`] over a [`LineSource`] until the input ends or a
//! command terminates the session, routing results and errors to the
//! evaluator's terminal.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::input::{LineSource, ReaderSource};
use crate::script::{EvalError, Evaluator, Step, Value};
use crate::terminal::PromptKind;

/// What a finished session asks the process to do.
pub type Status = i32;

/// Run commands from `input` until end of input (status 0) or until a
/// command ends the session (its status).  Errors are reported and the
/// loop moves on to the next command.
pub fn run(ev: &mut Evaluator, input: &mut dyn LineSource) -> Status {
    loop {
        if input.is_interactive() {
            ev.terminal().prompt(PromptKind::Primary);
        }
        match ev.consume(input) {
            Ok(Step::Eof) => return 0,
            Ok(Step::Blank | Step::Done(None)) => {}
            Ok(Step::Done(Some(value))) => {
                if !ev.take_silenced() {
                    ev.terminal().result(&value);
                }
            }
            Err(EvalError::Exit(status)) => {
                tracing::debug!(status, "session terminated");
                return status;
            }
            Err(EvalError::Io(e)) => {
                ev.terminal().error(&format!("input: {e}"));
                return 1;
            }
            Err(e) => {
                tracing::debug!(error = ?e, parse = e.is_parse_error(), "command failed");
                ev.terminal().error(&e.to_string());
            }
        }
    }
}

/// Run the script at `path` with `args` as its positional parameters.
pub fn run_file(ev: &mut Evaluator, path: &Path, args: &[String]) -> Status {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            ev.terminal().error(&format!("{}: {e}", path.display()));
            return 1;
        }
    };
    tracing::debug!(path = %path.display(), "running script");
    let mut input = ReaderSource::new(BufReader::new(file));
    let frame = args.iter().map(|a| Value::Str(a.clone())).collect();
    ev.with_positional(frame, |ev| Ok(run(ev, &mut input))).unwrap_or(1)
}

/// Run one command string (`-c`).  `Some(status)` if it ended the session.
pub fn run_command(ev: &mut Evaluator, text: &str) -> Option<Status> {
    match ev.evaluate_string(text) {
        Ok(Some(value)) if !ev.take_silenced() => ev.terminal().result(&value),
        Ok(_) => {}
        Err(EvalError::Exit(status)) => return Some(status),
        Err(e) => ev.terminal().error(&e.to_string()),
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
