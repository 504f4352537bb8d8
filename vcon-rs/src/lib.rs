//! vcon: an embeddable line-oriented command console.
//!
//! The [`script`] module holds the command language itself; the other
//! modules are the thin layer that turns it into a program (terminal
//! output, line input, configuration and the command line).

pub mod cli;
pub mod config;
pub mod console;
pub mod input;
pub mod script;
pub mod terminal;
