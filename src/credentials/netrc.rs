//! Parser for `.netrc` credential files.
//!
//! Supports the keywords understood by ftp(1) and curl: `machine`, `default`,
//! `login`, `account`, `password` and `macdef`.  Macro bodies are skipped.
//! `#` starts a comment that runs to the end of the line.  Tokens may be
//! double-quoted to embed whitespace.

use std::path::Path;

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum NetrcError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("netrc syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// The `(login, account, password)` triple stored for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    pub login: String,
    pub account: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: Vec<(String, NetrcEntry)>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    pub fn from_file(path: &Path) -> Result<Self, NetrcError> {
        let contents = std::fs::read_to_string(path).map_err(|source| NetrcError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let netrc = Self::parse(&contents)?;
        debug!(
            path = %path.display(),
            machines = netrc.machines.len(),
            has_default = netrc.default.is_some(),
            "parsed netrc"
        );
        Ok(netrc)
    }

    pub fn parse(contents: &str) -> Result<Self, NetrcError> {
        let mut lexer = Lexer::new(contents);
        let mut netrc = Netrc::default();

        while let Some(token) = lexer.next_token() {
            match token.value.as_str() {
                "machine" => {
                    let host = lexer.expect_value("machine")?;
                    let entry = parse_entry(&mut lexer)?;
                    match netrc.machines.iter_mut().find(|(h, _)| *h == host.value) {
                        Some((_, existing)) => *existing = entry,
                        None => netrc.machines.push((host.value, entry)),
                    }
                }
                "default" => {
                    let entry = parse_entry(&mut lexer)?;
                    netrc.default = Some(entry);
                }
                "macdef" => {
                    lexer.expect_value("macdef")?;
                    lexer.skip_macro_body();
                }
                other => {
                    return Err(NetrcError::Syntax {
                        line: token.line,
                        message: format!("unexpected token {other:?}"),
                    });
                }
            }
        }

        Ok(netrc)
    }

    /// Entry for `host`, falling back to the `default` entry.
    pub fn authenticators(&self, host: &str) -> Option<&NetrcEntry> {
        self.machines
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, entry)| entry)
            .or(self.default.as_ref())
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.machines.iter().map(|(h, _)| h.as_str())
    }
}

fn parse_entry(lexer: &mut Lexer<'_>) -> Result<NetrcEntry, NetrcError> {
    let mut entry = NetrcEntry::default();

    while let Some(token) = lexer.peek_token() {
        match token.value.as_str() {
            "machine" | "default" | "macdef" => break,
            "login" | "user" => {
                lexer.next_token();
                entry.login = lexer.expect_value("login")?.value;
            }
            "account" => {
                lexer.next_token();
                entry.account = Some(lexer.expect_value("account")?.value);
            }
            "password" => {
                lexer.next_token();
                entry.password = Some(lexer.expect_value("password")?.value);
            }
            other => {
                return Err(NetrcError::Syntax {
                    line: token.line,
                    message: format!("unexpected token {other:?} in machine entry"),
                });
            }
        }
    }

    Ok(entry)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Token {
    value: String,
    line: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek_token(&mut self) -> Option<Token> {
        if self.peeked.is_none() {
            self.peeked = self.read_token(true);
        }
        self.peeked.clone()
    }

    fn next_token(&mut self) -> Option<Token> {
        self.peeked.take().or_else(|| self.read_token(true))
    }

    /// Read the value following a keyword.  A leading `#` is part of the
    /// value here, not a comment.
    fn expect_value(&mut self, keyword: &str) -> Result<Token, NetrcError> {
        let line = self.line;
        let token = match self.peeked.take() {
            Some(token) => Some(token),
            None => self.read_token(false),
        };
        token.ok_or_else(|| NetrcError::Syntax {
            line,
            message: format!("{keyword} is missing its value"),
        })
    }

    fn read_token(&mut self, skip_comments: bool) -> Option<Token> {
        loop {
            match self.chars.peek().copied() {
                None => return None,
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') if skip_comments => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some(_) => break,
            }
        }

        let line = self.line;
        let mut value = String::new();

        if self.chars.peek() == Some(&'"') {
            self.bump();
            while let Some(c) = self.bump() {
                match c {
                    '"' => break,
                    '\\' => {
                        if let Some(escaped) = self.bump() {
                            value.push(escaped);
                        }
                    }
                    _ => value.push(c),
                }
            }
        } else {
            while let Some(&c) = self.chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                self.bump();
                if c == '\\' {
                    if let Some(escaped) = self.bump() {
                        value.push(escaped);
                    }
                } else {
                    value.push(c);
                }
            }
        }

        Some(Token { value, line })
    }

    /// Skip the rest of the `macdef` line and every following line up to and
    /// including the first blank one.
    fn skip_macro_body(&mut self) {
        self.peeked = None;
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
        loop {
            let mut blank = true;
            let mut saw_any = false;
            while let Some(c) = self.bump() {
                saw_any = true;
                if c == '\n' {
                    break;
                }
                if !c.is_whitespace() {
                    blank = false;
                }
            }
            if !saw_any || blank {
                return;
            }
        }
    }
}
