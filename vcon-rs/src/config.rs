//! Console configuration file parser.
//!
//! One `key = value` setting per line:
//!
//! | Key                   | Value                     | Default |
//! |-----------------------|---------------------------|---------|
//! | `prompt`              | text                      | `"> "`  |
//! | `continuation_prompt` | text                      | `"... "`|
//! | `max_depth`           | positive integer          | `128`   |
//! | `color`               | `true` / `false`          | `true`  |
//! | `banner`              | `true` / `false`          | `true`  |
//!
//! Lines starting with `#` or `;` are comments.  A value may be wrapped in
//! double quotes to keep leading or trailing spaces.  Unknown keys and bad
//! values are reported but do not stop the rest of the file from loading.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::script::DEFAULT_MAX_DEPTH;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Console settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub continuation_prompt: String,
    /// Deepest allowed nesting of evaluations (macros, `if`, `eval`, …).
    pub max_depth: usize,
    /// Colour error output when stderr is a terminal.
    pub color: bool,
    /// Print the startup banner in interactive sessions.
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "> ".to_owned(),
            continuation_prompt: "... ".to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
            color: true,
            banner: true,
        }
    }
}

impl Config {
    /// Parse a config string, starting from the defaults.
    ///
    /// Returns the config and a list of any problems found on the way.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::default();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Err(message) = config.apply(line) {
                errors.push(ConfigError { line: i + 1, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    fn apply(&mut self, line: &str) -> Result<(), String> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("expected 'key = value', found {line:?}"))?;
        let key = key.trim();
        let value = unquote(value.trim());
        match key {
            "prompt" => self.prompt = value.to_owned(),
            "continuation_prompt" => self.continuation_prompt = value.to_owned(),
            "max_depth" => {
                self.max_depth = value
                    .parse()
                    .ok()
                    .filter(|&n: &usize| n > 0)
                    .ok_or_else(|| format!("max_depth: not a positive integer: {value:?}"))?;
            }
            "color" => self.color = parse_bool(key, value)?,
            "banner" => self.banner = parse_bool(key, value)?,
            _ => return Err(format!("unknown setting: {key}")),
        }
        Ok(())
    }
}

/// Location of the per-user config file (`…/vcon/vcon.conf` under the
/// platform's config directory).
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vcon").map(|dirs| dirs.config_dir().join("vcon.conf"))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(format!("{key}: not a boolean: {value:?}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        let (cfg, errs) = Config::load_str("");
        assert!(errs.is_empty());
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.prompt, "> ");
        assert_eq!(cfg.max_depth, 128);
    }

    #[test]
    fn all_keys() {
        let src = "\
# console settings
prompt = \"vcon> \"
continuation_prompt = ..
; depth
max_depth = 64
color = off
banner = false
";
        let (cfg, errs) = Config::load_str(src);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.prompt, "vcon> ");
        assert_eq!(cfg.continuation_prompt, "..");
        assert_eq!(cfg.max_depth, 64);
        assert!(!cfg.color);
        assert!(!cfg.banner);
    }

    #[test]
    fn errors_are_collected_per_line() {
        let src = "max_depth = 0\nwidth = 80\ncolor = maybe\nnonsense\nbanner = no";
        let (cfg, errs) = Config::load_str(src);
        let lines: Vec<usize> = errs.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
        assert_eq!(errs[1].to_string(), "line 2: unknown setting: width");
        assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!cfg.banner);
    }

    #[test]
    fn load_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vcon.conf");
        std::fs::write(&path, "prompt = $ \n").unwrap();
        let (cfg, errs) = Config::load_file(&path).unwrap();
        assert!(errs.is_empty());
        assert_eq!(cfg.prompt, "$");
        assert!(Config::load_file(&dir.path().join("missing")).is_err());
    }
}
