//! Command tokenizer.
//!
//! Reads one logical command (a physical line plus any continuation lines
//! an open brace literal asks for) and turns it into argument segments,
//! running each pipe stage as soon as its `|` is reached.
//!
//! | Syntax          | Meaning                                                  |
//! |-----------------|----------------------------------------------------------|
//! | `word`          | One argument; `$x` / `${name}` expand inside it          |
//! | `"text"`        | One argument; `\` escapes and `$` expansion apply        |
//! | `'text'`        | One argument, verbatim                                   |
//! | `{text}`        | One argument, verbatim, nestable, may span lines         |
//! | `<name`         | Argument replaced by the content of file `name`          |
//! | `a \| b`        | Result of `a` flattened onto the end of `b`'s arguments  |
//! | `# text`        | Comment to end of line (at a word start only)            |
//!
//! Double-quote escapes: `\n \t \r \0 \' \" \\`, `\xHH` (one raw byte),
//! `\uHHHH` (UTF-8 of the code point).  Any other `\c` is kept as written.
//!
//! Arguments are accumulated as bytes so `\xHH` can emit arbitrary bytes;
//! a finished argument that is not valid UTF-8 is converted lossily.

use super::args::Arguments;
use super::error::{EvalError, EvalResult};
use super::eval::{Evaluator, Step};
use super::value::{flatten_reply, Value};
use crate::input::LineSource;
use crate::terminal::PromptKind;

// ── State ─────────────────────────────────────────────────────────────────────

/// Tokenizer state.  Only the brace family survives the end of a physical
/// line; every other state is resolved (or rejected) when the line ends.
/// A pipe is handled the moment it is seen and never becomes a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Blank,
    Word,
    WordVar,
    WordVarBrace,
    DoubleQuote,
    DoubleQuoteEscape,
    DoubleQuoteHexEscape { seen: u8, acc: u32 },
    DoubleQuoteUnicodeEscape { seen: u8, acc: u32 },
    DoubleQuoteVar,
    DoubleQuoteVarBrace,
    SingleQuote,
    AfterRedirect,
    Brace(usize),
    BraceInDoubleQuote(usize),
    BraceInDoubleQuoteEscape(usize),
    BraceInSingleQuote(usize),
}

impl State {
    fn in_brace(self) -> bool {
        matches!(
            self,
            State::Brace(_)
                | State::BraceInDoubleQuote(_)
                | State::BraceInDoubleQuoteEscape(_)
                | State::BraceInSingleQuote(_)
        )
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Read, tokenize and execute one command from `input`.
pub(crate) fn read_command(ev: &mut Evaluator, input: &mut dyn LineSource) -> EvalResult<Step> {
    let Some(mut line) = input.read_line()? else {
        return Ok(Step::Eof);
    };
    let mut lexer = Lexer::new();
    loop {
        lexer.scan(&line, ev)?;
        if !lexer.state.in_brace() {
            break;
        }
        if input.is_interactive() {
            ev.terminal().prompt(PromptKind::Continuation);
        }
        let Some(next) = input.read_line()? else {
            return Err(EvalError::UnexpectedEof);
        };
        tracing::trace!(state = ?lexer.state, "brace continuation line");
        if !lexer.word.is_empty() {
            lexer.word.push(b'\n');
        }
        line = next;
    }
    lexer.finish(ev)
}

/// Double-quote `text` so that it reads back as exactly one argument equal
/// to `text`.  `$` is written as `\x24` so it cannot expand.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '$' => out.push_str("\\x24"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    state: State,
    /// Bytes of the argument being built.
    word: Vec<u8>,
    /// Name collected inside `${…}`.
    var_name: String,
    /// The argument being built names a file to load (`<name`).
    redirect: bool,
    /// Finished arguments of the current pipe stage (verb first).
    segment: Vec<Value>,
    /// Flattened result of the previous pipe stage.
    piped: Vec<String>,
    after_pipe: bool,
}

impl Lexer {
    fn new() -> Self {
        Self {
            state: State::Blank,
            word: Vec::new(),
            var_name: String::new(),
            redirect: false,
            segment: Vec::new(),
            piped: Vec::new(),
            after_pipe: false,
        }
    }

    /// Feed one physical line through the state machine.
    fn scan(&mut self, line: &str, ev: &mut Evaluator) -> EvalResult<()> {
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match self.state {
                State::Blank | State::AfterRedirect => {
                    if is_space(c) {
                        continue;
                    }
                    if self.state == State::AfterRedirect && matches!(c, '|' | '<' | '#') {
                        return Err(EvalError::MissingRedirect);
                    }
                    match c {
                        '#' => return Ok(()),
                        '|' => self.pipe(ev)?,
                        '<' => {
                            self.redirect = true;
                            self.state = State::AfterRedirect;
                        }
                        '"' => self.state = State::DoubleQuote,
                        '\'' => self.state = State::SingleQuote,
                        '{' => self.state = State::Brace(1),
                        '$' => self.state = State::WordVar,
                        _ => {
                            self.push_char(c);
                            self.state = State::Word;
                        }
                    }
                }

                State::Word => match c {
                    c if is_space(c) => {
                        self.finish_arg(ev)?;
                        self.state = State::Blank;
                    }
                    '"' => {
                        self.finish_arg(ev)?;
                        self.state = State::DoubleQuote;
                    }
                    '\'' => {
                        self.finish_arg(ev)?;
                        self.state = State::SingleQuote;
                    }
                    '|' => {
                        self.finish_arg(ev)?;
                        self.state = State::Blank;
                        self.pipe(ev)?;
                    }
                    '<' => {
                        self.finish_arg(ev)?;
                        self.redirect = true;
                        self.state = State::AfterRedirect;
                    }
                    '$' => self.state = State::WordVar,
                    _ => self.push_char(c),
                },

                State::WordVar => match c {
                    '{' => {
                        self.var_name.clear();
                        self.state = State::WordVarBrace;
                    }
                    c if is_space(c) || matches!(c, '"' | '\'' | '|' | '<') => {
                        return Err(EvalError::BadVariable("'$' is not followed by a name"));
                    }
                    _ => {
                        let mut buf = [0u8; 4];
                        self.expand(ev, c.encode_utf8(&mut buf));
                        self.state = State::Word;
                    }
                },

                State::WordVarBrace => match c {
                    '}' => {
                        let name = std::mem::take(&mut self.var_name);
                        self.expand(ev, &name);
                        self.state = State::Word;
                    }
                    _ => self.var_name.push(c),
                },

                State::DoubleQuote => match c {
                    '"' => {
                        self.finish_arg(ev)?;
                        self.state = State::Blank;
                    }
                    '\\' => self.state = State::DoubleQuoteEscape,
                    '$' => self.state = State::DoubleQuoteVar,
                    _ => self.push_char(c),
                },

                State::DoubleQuoteEscape => {
                    self.state = State::DoubleQuote;
                    match c {
                        'n' => self.word.push(b'\n'),
                        't' => self.word.push(b'\t'),
                        'r' => self.word.push(b'\r'),
                        '0' => self.word.push(0),
                        '\'' | '"' | '\\' => self.push_char(c),
                        'x' => self.state = State::DoubleQuoteHexEscape { seen: 0, acc: 0 },
                        'u' => self.state = State::DoubleQuoteUnicodeEscape { seen: 0, acc: 0 },
                        other => {
                            self.word.push(b'\\');
                            self.push_char(other);
                        }
                    }
                }

                State::DoubleQuoteHexEscape { seen, acc } => {
                    let acc = acc * 16 + hex_digit(c, 'x')?;
                    if seen + 1 == 2 {
                        // Two hex digits never exceed 0xff.
                        self.word.push(acc as u8);
                        self.state = State::DoubleQuote;
                    } else {
                        self.state = State::DoubleQuoteHexEscape { seen: seen + 1, acc };
                    }
                }

                State::DoubleQuoteUnicodeEscape { seen, acc } => {
                    let acc = acc * 16 + hex_digit(c, 'u')?;
                    if seen + 1 == 4 {
                        let ch = char::from_u32(acc).ok_or_else(|| {
                            EvalError::BadEscape(format!("\\u{acc:04x} is not a character"))
                        })?;
                        self.push_char(ch);
                        self.state = State::DoubleQuote;
                    } else {
                        self.state = State::DoubleQuoteUnicodeEscape { seen: seen + 1, acc };
                    }
                }

                State::DoubleQuoteVar => match c {
                    '{' => {
                        self.var_name.clear();
                        self.state = State::DoubleQuoteVarBrace;
                    }
                    c if is_space(c) || c == '"' => {
                        return Err(EvalError::BadVariable("'$' is not followed by a name"));
                    }
                    _ => {
                        let mut buf = [0u8; 4];
                        self.expand(ev, c.encode_utf8(&mut buf));
                        self.state = State::DoubleQuote;
                    }
                },

                State::DoubleQuoteVarBrace => match c {
                    '}' => {
                        let name = std::mem::take(&mut self.var_name);
                        self.expand(ev, &name);
                        self.state = State::DoubleQuote;
                    }
                    _ => self.var_name.push(c),
                },

                State::SingleQuote => match c {
                    '\'' => {
                        self.finish_arg(ev)?;
                        self.state = State::Blank;
                    }
                    _ => self.push_char(c),
                },

                State::Brace(depth) => match c {
                    '{' => {
                        self.push_char(c);
                        self.state = State::Brace(depth + 1);
                    }
                    '}' if depth > 1 => {
                        self.push_char(c);
                        self.state = State::Brace(depth - 1);
                    }
                    '}' => {
                        // The outer brace only closes where a word would end.
                        let closes = chars
                            .peek()
                            .map_or(true, |&n| is_space(n) || matches!(n, '|' | '<' | '"' | '\''));
                        if closes {
                            self.finish_arg(ev)?;
                            self.state = State::Blank;
                        } else {
                            self.push_char(c);
                        }
                    }
                    '"' => {
                        self.push_char(c);
                        self.state = State::BraceInDoubleQuote(depth);
                    }
                    '\'' => {
                        self.push_char(c);
                        self.state = State::BraceInSingleQuote(depth);
                    }
                    _ => self.push_char(c),
                },

                State::BraceInDoubleQuote(depth) => {
                    self.push_char(c);
                    match c {
                        '\\' => self.state = State::BraceInDoubleQuoteEscape(depth),
                        '"' => self.state = State::Brace(depth),
                        _ => {}
                    }
                }

                State::BraceInDoubleQuoteEscape(depth) => {
                    self.push_char(c);
                    self.state = State::BraceInDoubleQuote(depth);
                }

                State::BraceInSingleQuote(depth) => {
                    self.push_char(c);
                    if c == '\'' {
                        self.state = State::Brace(depth);
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve the end of the last physical line and run the final stage.
    fn finish(mut self, ev: &mut Evaluator) -> EvalResult<Step> {
        match self.state {
            State::Blank => {}
            State::Word => self.finish_arg(ev)?,
            State::WordVar => return Err(EvalError::BadVariable("trailing '$'")),
            State::WordVarBrace | State::DoubleQuoteVarBrace => {
                return Err(EvalError::BadVariable("unterminated '${'"));
            }
            State::DoubleQuote
            | State::DoubleQuoteEscape
            | State::DoubleQuoteVar
            | State::SingleQuote => return Err(EvalError::UnterminatedQuote),
            State::DoubleQuoteHexEscape { .. } | State::DoubleQuoteUnicodeEscape { .. } => {
                return Err(EvalError::BadEscape("escape cut short by end of line".into()));
            }
            State::AfterRedirect => return Err(EvalError::MissingRedirect),
            State::Brace(_)
            | State::BraceInDoubleQuote(_)
            | State::BraceInDoubleQuoteEscape(_)
            | State::BraceInSingleQuote(_) => return Err(EvalError::UnexpectedEof),
        }
        if self.segment.is_empty() {
            return if self.after_pipe { Err(EvalError::NoVerb) } else { Ok(Step::Blank) };
        }
        let result = self.run_stage(ev)?;
        Ok(Step::Done(result))
    }

    /// `|`: run the stage collected so far and keep its flattened result.
    fn pipe(&mut self, ev: &mut Evaluator) -> EvalResult<()> {
        if self.segment.is_empty() {
            return Err(EvalError::NoVerb);
        }
        let result = self.run_stage(ev)?;
        self.piped = flatten_reply(result.as_ref());
        self.after_pipe = true;
        Ok(())
    }

    fn run_stage(&mut self, ev: &mut Evaluator) -> EvalResult<Option<Value>> {
        let mut args = Arguments::new(std::mem::take(&mut self.segment));
        let verb = args.shift().map(|v| v.to_string()).unwrap_or_default();
        for token in self.piped.drain(..) {
            args.push(Value::Str(token));
        }
        ev.invoke(&verb, args)
    }

    /// Close the argument being built and append it to the segment.
    fn finish_arg(&mut self, ev: &mut Evaluator) -> EvalResult<()> {
        let text = bytes_to_string(std::mem::take(&mut self.word));
        let text = if std::mem::take(&mut self.redirect) {
            load_redirect(ev, &text)?
        } else {
            text
        };
        self.segment.push(Value::Str(text));
        Ok(())
    }

    fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.word.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    /// Append the rendering of variable `name`; unset expands to nothing.
    fn expand(&mut self, ev: &Evaluator, name: &str) {
        if let Some(value) = ev.env().get(name) {
            self.word.extend_from_slice(value.to_string().as_bytes());
        }
    }
}

fn hex_digit(c: char, kind: char) -> EvalResult<u32> {
    c.to_digit(16)
        .ok_or_else(|| EvalError::BadEscape(format!("\\{kind} expects hex digits, found {c:?}")))
}

fn bytes_to_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn load_redirect(ev: &mut Evaluator, path: &str) -> EvalResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|source| EvalError::Redirect { path: path.into(), source })?;
    tracing::debug!(path, bytes = bytes.len(), "redirect loaded");
    ev.terminal().message(&format!("(loaded {path}, {} bytes)", bytes.len()));
    Ok(bytes_to_string(bytes))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
