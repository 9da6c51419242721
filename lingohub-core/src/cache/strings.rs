//! `.strings` table parser
//!
//! Accepts the old-style property list format used for string tables:
//!
//! ```text
//! /* Greeting on the start screen */
//! "welcome.title" = "Welcome";
//! plain_key = "Unquoted keys work too";
//! ```

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Parse failure with the 1-based line it happened on.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Decodes table bytes, honouring UTF-16 byte order marks.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec()).ok(),
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

fn utf16(bytes: &[u8], convert: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| convert([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

/// Parses a whole table.
pub fn parse(input: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        line: 1,
    };
    let mut table = HashMap::new();

    loop {
        parser.skip_trivia()?;
        if parser.chars.peek().is_none() {
            break;
        }
        let key = parser.token()?;
        parser.skip_trivia()?;
        parser.expect('=')?;
        parser.skip_trivia()?;
        let value = parser.token()?;
        parser.skip_trivia()?;
        parser.expect(';')?;
        table.insert(key, value);
    }

    Ok(table)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl Parser<'_> {
    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.next();
                }
                Some('/') => {
                    self.next();
                    match self.next() {
                        Some('/') => {
                            while let Some(c) = self.next() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => self.block_comment()?,
                        _ => return Err(self.error("stray '/'")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn block_comment(&mut self) -> Result<(), ParseError> {
        let mut star = false;
        while let Some(c) = self.next() {
            if star && c == '/' {
                return Ok(());
            }
            star = c == '*';
        }
        Err(self.error("unterminated comment"))
    }

    fn token(&mut self) -> Result<String, ParseError> {
        match self.chars.peek() {
            Some('"') => {
                self.next();
                self.quoted()
            }
            Some(c) if is_bare(*c) => {
                let mut out = String::new();
                while let Some(c) = self.chars.peek() {
                    if !is_bare(*c) {
                        break;
                    }
                    out.push(*c);
                    self.next();
                }
                Ok(out)
            }
            Some(&c) => Err(self.error(format!("unexpected '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.next() {
                Some('"') => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        match self.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('u') | Some('U') => {
                let unit = self.hex4()?;
                let c = if (0xD800..0xDC00).contains(&unit) {
                    // high surrogate, a low one must follow
                    if self.next() != Some('\\') || !matches!(self.next(), Some('u' | 'U')) {
                        return Err(self.error("unpaired surrogate"));
                    }
                    let low = self.hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error("unpaired surrogate"));
                    }
                    let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    char::from_u32(code)
                } else {
                    char::from_u32(u32::from(unit))
                };
                out.push(c.ok_or_else(|| self.error("invalid unicode escape"))?);
            }
            Some(c) => out.push(c),
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }

    fn hex4(&mut self) -> Result<u16, ParseError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let digit = self
                .next()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            value = value * 16 + digit as u16;
        }
        Ok(value)
    }
}

fn is_bare(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '$' | ':')
}
