//! Command-line argument parsing.
//!
//! Usage:
//!   vcon [-f[<rcfile>]] [-C<config>] [-c<cmd>] [-dq] [<script> [<arg>…]]

use std::path::PathBuf;

use directories::BaseDirs;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which startup script to run.
    pub rc: RcFile,
    /// Config file override (`-C<config>`).
    pub config: Option<PathBuf>,
    /// Command to execute after the startup script (`-c<cmd>`).
    pub command: Option<String>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Suppress the banner (`-q`).
    pub quiet: bool,
    /// Script to run instead of reading stdin, with its arguments.
    pub script: Option<Script>,
}

/// How to choose the startup script.
#[derive(Debug, Default)]
pub enum RcFile {
    /// Load `~/.vconrc` if it exists (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip the startup script.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// A script named on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub path: PathBuf,
    /// Positional parameters (`$1`…) for the script.
    pub args: Vec<String>,
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // The first non-flag argument names the script; the rest are its own.
        if !arg.starts_with('-') || arg == "-" {
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'q' => args.quiet = true,

                // -f[<file>]: only the embedded form takes a file, so
                // `-f script` skips the rc file and runs `script`.
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.rc = RcFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.rc = RcFile::Skip;
                    }
                }

                // -c<cmd> / -C<config>
                flag @ ('c' | 'C') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    if flag == 'c' {
                        args.command = Some(value);
                    } else {
                        args.config = Some(PathBuf::from(value));
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    if !positional.is_empty() {
        let path = PathBuf::from(positional.remove(0));
        args.script = Some(Script { path, args: positional });
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// The user's startup script, `~/.vconrc`, if it exists.
pub fn find_rc() -> Option<PathBuf> {
    let dirs = BaseDirs::new()?;
    Some(dirs.home_dir().join(".vconrc")).filter(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
