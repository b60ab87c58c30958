//! lexer.rs — Analyse lexicale neon
//!
//! Prend le texte brut d'un fichier et produit les tokens. Les sauts de ligne
//! sont des tokens (ils terminent les instructions) ; espaces, tabulations et
//! `\r` sont ignorés ; `//` commente jusqu'à la fin de ligne.
//!
//! Erreurs : symbole inconnu, chaîne non terminée, nombre invalide,
//! identifiant commençant par un chiffre.

use crate::diagnostics::SyntaxError;
use crate::token::{double_symbol, keyword, symbol, Token, TokenKind};

/// Tokenise intégralement `source` (le dernier token est toujours `Eof`).
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).tokenize_all()
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    i: usize,
    line: u32,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), i: 0, line: 1, line_start: 0 }
    }

    pub fn tokenize_all(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut v = Vec::new();
        loop {
            let t = self.next_token()?;
            let end = t.is(TokenKind::Eof);
            v.push(t);
            if end {
                break;
            }
        }
        log::trace!("lexer: {} tokens", v.len());
        Ok(v)
    }

    /// Lit le prochain token (ignore espaces/commentaires).
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            let Some(&c) = self.bytes.get(self.i) else {
                return Ok(self.mk(TokenKind::Eof, self.i, self.i));
            };
            match c {
                b'\n' => {
                    let tok = self.mk(TokenKind::Newline, self.i, self.i + 1);
                    self.i += 1;
                    self.line += 1;
                    self.line_start = self.i;
                    return Ok(tok);
                }
                b' ' | b'\t' | b'\r' => self.i += 1,
                b'/' if self.peek_at(1) == Some(b'/') => {
                    while self.bytes.get(self.i).is_some_and(|&b| b != b'\n') {
                        self.i += 1;
                    }
                }
                b'"' => return self.lex_string(),
                b'0'..=b'9' => return self.lex_number(),
                c if c.is_ascii_alphabetic() || c == b'_' => return Ok(self.lex_ident()),
                _ => return self.lex_symbol(),
            }
        }
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.i + ahead).copied()
    }

    fn col(&self, at: usize) -> u32 {
        u32::try_from(at - self.line_start).unwrap_or(u32::MAX)
    }

    fn mk(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            lexeme: self.src[start..end].to_string(),
            line: self.line,
            start: self.col(start),
            end: self.col(end),
        }
    }

    fn error(&self, msg: impl Into<String>, start: usize, end: usize) -> SyntaxError {
        let line_end = self.src[self.line_start..]
            .find('\n')
            .map_or(self.src.len(), |n| self.line_start + n);
        SyntaxError {
            source_line: self.src[self.line_start..line_end].to_string(),
            ..SyntaxError::new(msg, self.line, self.col(start), self.col(end))
        }
    }

    fn lex_string(&mut self) -> Result<Token, SyntaxError> {
        let start = self.i;
        self.i += 1; // guillemet ouvrant
        loop {
            match self.bytes.get(self.i) {
                Some(b'"') => {
                    self.i += 1;
                    return Ok(self.mk(TokenKind::Str, start, self.i));
                }
                Some(b'\n') | None => return Err(self.error("unterminated string", start, self.i)),
                Some(_) => self.i += 1,
            }
        }
    }

    fn lex_number(&mut self) -> Result<Token, SyntaxError> {
        let start = self.i;
        let mut dots = 0usize;
        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_digit() {
                self.i += 1;
            } else if c == b'.' {
                dots += 1;
                self.i += 1;
            } else if c.is_ascii_alphabetic() || c == b'_' {
                return Err(self.error("cannot start identifier with digit", start, self.i + 1));
            } else {
                break;
            }
        }
        let text = &self.src[start..self.i];
        if dots > 1 || text.ends_with('.') {
            return Err(self.error(format!("invalid number literal '{text}'"), start, self.i));
        }
        Ok(self.mk(TokenKind::Number { is_float: dots == 1 }, start, self.i))
    }

    fn lex_ident(&mut self) -> Token {
        let start = self.i;
        while self.peek_at(0).is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.i += 1;
        }
        // mot réservé d'abord
        let kind = keyword(&self.src[start..self.i]).unwrap_or(TokenKind::Ident);
        self.mk(kind, start, self.i)
    }

    fn lex_symbol(&mut self) -> Result<Token, SyntaxError> {
        let start = self.i;
        if let Some(next) = self.peek_at(1) {
            if let Some(kind) = double_symbol([self.bytes[start], next]) {
                self.i += 2;
                return Ok(self.mk(kind, start, self.i));
            }
        }
        if let Some(kind) = symbol(self.bytes[start]) {
            self.i += 1;
            return Ok(self.mk(kind, start, self.i));
        }
        let ch = self.src[start..].chars().next().unwrap_or('?');
        Err(self.error(format!("unexpected token '{ch}'"), start, start + ch.len_utf8()))
    }
}

/* --------------------------------- Tests --------------------------------- */
