use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vcon::cli::{self, RcFile};
use vcon::config::{self, Config};
use vcon::console;
use vcon::input::ReaderSource;
use vcon::script::Evaluator;
use vcon::terminal::ConsoleTerminal;

const USAGE: &str = "Usage: vcon [-f[<rcfile>]] [-C<config>] [-c<cmd>] [-dq] [<script> [<arg>…]]";

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("vcon: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    init_tracing(args.debug);

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = match args.config.clone().or_else(config::default_path) {
        Some(path) if path.exists() || args.config.is_some() => {
            match Config::load_file(&path) {
                Ok((config, errors)) => {
                    for e in errors {
                        tracing::warn!(path = %path.display(), "config: {e}");
                    }
                    config
                }
                Err(e) => {
                    eprintln!("vcon: {}: {e}", path.display());
                    std::process::exit(1);
                }
            }
        }
        _ => Config::default(),
    };

    let interactive = unsafe {
        libc::isatty(libc::STDIN_FILENO) != 0 && libc::isatty(libc::STDOUT_FILENO) != 0
    };
    let mut ev = Evaluator::with_config(Box::new(ConsoleTerminal::stdio(&config)), &config);

    // ── Startup script ────────────────────────────────────────────────────────
    let rc = match args.rc {
        RcFile::Skip => None,
        RcFile::Explicit(path) => Some(path),
        RcFile::Search => cli::find_rc(),
    };
    if let Some(path) = rc {
        tracing::debug!(path = %path.display(), "loading startup script");
        let status = console::run_file(&mut ev, &path, &[]);
        if status != 0 {
            std::process::exit(status);
        }
    }

    // ── Startup command (-c<cmd>) ─────────────────────────────────────────────
    if let Some(cmd) = args.command {
        let status = console::run_command(&mut ev, &cmd).unwrap_or(0);
        std::process::exit(status);
    }

    // ── Script or console ─────────────────────────────────────────────────────
    let status = match args.script {
        Some(script) => console::run_file(&mut ev, &script.path, &script.args),
        None => {
            if interactive && config.banner && !args.quiet {
                let ver = env!("CARGO_PKG_VERSION");
                ev.terminal().message(&format!("vcon {ver}. Type `exit' to quit."));
            }
            let stdin = io::stdin();
            let mut input = ReaderSource::new(stdin.lock()).interactive(interactive);
            let status = console::run(&mut ev, &mut input);
            if interactive && status == 0 {
                // Leave the shell prompt on a fresh line after ^D.
                println!();
            }
            status
        }
    };
    std::process::exit(status);
}

/// Route `tracing` events to stderr.  `RUST_LOG` wins; `-d` defaults the
/// filter to `debug`, otherwise only warnings are shown.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

