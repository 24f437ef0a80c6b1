//! Token production.
//!
//! One token per [`Lexer::next_token`] call. The scanner always makes
//! forward progress: bytes it cannot place become [`TokenKind::Rogue`]
//! tokens rather than errors, so the only hard failures are a malformed
//! identifier sigil, an unterminated string, and an integer literal that
//! overflows `i64`.

use basic_diagnostic::{bad_identifier, syntax_at, DiagResult};
use basic_ir::{keyword_from_str, SharedInterner, SourcePos, Token, TokenKind};

use crate::source::{Cursor, SourceBuffer};

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric() || is_sigil(b)
}

fn is_sigil(b: u8) -> bool {
    matches!(b, b'$' | b'%' | b'#' | b'!')
}

/// The tokenizer.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    interner: SharedInterner,
    line: u32,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over a prepared buffer.
    pub fn new(buffer: &'a SourceBuffer, interner: SharedInterner) -> Self {
        Lexer {
            cursor: buffer.cursor(),
            interner,
            line: 1,
            line_start: 0,
        }
    }

    fn pos_here(&self) -> SourcePos {
        self.pos_at(self.cursor.pos())
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "line and column counts fit u32 for any source this dialect handles"
    )]
    fn pos_at(&self, byte: usize) -> SourcePos {
        SourcePos::new(self.line, (byte - self.line_start + 1) as u32)
    }

    fn start_new_line(&mut self) {
        self.line += 1;
        self.line_start = self.cursor.pos();
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> DiagResult<Token> {
        loop {
            if self.cursor.is_eof() {
                return Ok(Token::new(TokenKind::Eof, self.pos_here()));
            }
            let b = self.cursor.current();
            match b {
                b'\n' => {
                    let pos = self.pos_here();
                    self.cursor.advance();
                    self.start_new_line();
                    return Ok(Token::new(TokenKind::Eol, pos));
                }
                b'\r' if self.cursor.peek() == b'\n' => {
                    let pos = self.pos_here();
                    self.cursor.advance_n(2);
                    self.start_new_line();
                    return Ok(Token::new(TokenKind::Eol, pos));
                }
                // Horizontal whitespace, including a stray lone CR.
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => self.cursor.advance(),
                b'0'..=b'9' => return self.number(),
                b'.' if self.cursor.peek().is_ascii_digit() => return self.number(),
                b'"' => return self.string(),
                _ if is_ident_start(b) => return self.identifier(),
                _ => return Ok(self.operator(b)),
            }
        }
    }

    fn number(&mut self) -> DiagResult<Token> {
        let start = self.cursor.pos();
        let pos = self.pos_at(start);
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.current() == b'.' {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = if text.contains('.') {
            match text.parse::<f64>() {
                Ok(v) => TokenKind::Real(v),
                Err(_) => return Err(syntax_at(format!("bad number `{text}`"), pos)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => TokenKind::Int(v),
                Err(_) => {
                    return Err(syntax_at(format!("integer literal `{text}` out of range"), pos))
                }
            }
        };
        Ok(Token::new(kind, pos))
    }

    fn string(&mut self) -> DiagResult<Token> {
        let pos = self.pos_here();
        self.cursor.advance(); // opening quote
        let start = self.cursor.pos();
        if self.cursor.skip_to_string_delim() != b'"' {
            return Err(syntax_at("unterminated string", pos));
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        self.cursor.advance(); // closing quote
        Ok(Token::new(TokenKind::Str(self.interner.intern(text)), pos))
    }

    fn identifier(&mut self) -> DiagResult<Token> {
        let start = self.cursor.pos();
        let pos = self.pos_at(start);
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        // A type sigil is only legal as the final character.
        let bytes = text.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if is_sigil(b) && i + 1 != bytes.len() {
                return Err(bad_identifier(text, pos));
            }
        }

        let folded = text.to_ascii_uppercase();
        let kind = match keyword_from_str(&folded) {
            Some(kw) => kw,
            None => TokenKind::Ident(self.interner.intern(&folded)),
        };
        Ok(Token::new(kind, pos))
    }

    fn operator(&mut self, b: u8) -> Token {
        use TokenKind::*;
        let pos = self.pos_here();
        let next = self.cursor.peek();
        // Two-character relations first; both spellings are accepted.
        let (kind, len) = match (b, next) {
            (b'<', b'=') | (b'=', b'<') => (LtEq, 2),
            (b'>', b'=') | (b'=', b'>') => (GtEq, 2),
            (b'<', b'>') | (b'>', b'<') => (NotEq, 2),
            (b'+', _) => (Plus, 1),
            (b'-', _) => (Minus, 1),
            (b'*', _) => (Star, 1),
            (b'/', _) => (Slash, 1),
            (b'^', _) => (Caret, 1),
            (b'=', _) => (Eq, 1),
            (b'<', _) => (Lt, 1),
            (b'>', _) => (Gt, 1),
            (b'(', _) => (LParen, 1),
            (b')', _) => (RParen, 1),
            (b',', _) => (Comma, 1),
            (b';', _) => (Semi, 1),
            (b':', _) => (Colon, 1),
            (b'.', _) => (Dot, 1),
            (b'{', _) => (LBrace, 1),
            (b'}', _) => (RBrace, 1),
            (b'\'', _) => (Quote, 1),
            _ => (Rogue(b), 1),
        };
        self.cursor.advance_n(len);
        Token::new(kind, pos)
    }
}

/// Tokenize a whole source, ending with an `Eof` token.
pub fn tokenize(source: &str, interner: &SharedInterner) -> DiagResult<Vec<Token>> {
    let buffer = SourceBuffer::new(source);
    let mut lexer = Lexer::new(&buffer, interner.clone());
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == TokenKind::Eof;
        out.push(tok);
        if done {
            return Ok(out);
        }
    }
}
