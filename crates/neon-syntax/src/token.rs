//! token.rs — Définitions des tokens neon
//!
//! Tables de mots-clés / symboles gardées ici pour que le lexer et le
//! parser partagent la même source de vérité.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    // Fin
    Eof,
    Newline,

    // Ident & littéraux
    Ident,
    Number { is_float: bool },
    Str,

    // Mots-clés
    Func,
    Return,
    Print,
    True,
    False,

    // Symboles simples
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    Not,
    Greater,
    Less,
    Comma,
    Colon,

    // Symboles doubles
    EqualEqual,
    NotEqual,
    GreaterEqual,
    LessEqual,
    AndAnd,
    OrOr,
    ColonEqual,
}

impl TokenKind {
    /// Libellé lisible pour les messages d'erreur.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "end of input",
            Newline => "newline",
            Ident => "identifier",
            Number { .. } => "number",
            Str => "string",
            Func => "func",
            Return => "return",
            Print => "print",
            True => "true",
            False => "false",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Equal => "=",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LSquare => "[",
            RSquare => "]",
            Not => "!",
            Greater => ">",
            Less => "<",
            Comma => ",",
            Colon => ":",
            EqualEqual => "==",
            NotEqual => "!=",
            GreaterEqual => ">=",
            LessEqual => "<=",
            AndAnd => "&&",
            OrOr => "||",
            ColonEqual => ":=",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Un token et sa position : ligne 1-based, colonnes 0-based (octets) dans la ligne.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    /// Texte brut ; les chaînes gardent leurs guillemets.
    pub lexeme: String,
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Contenu d'un littéral chaîne, sans les guillemets.
    pub fn string_value(&self) -> &str {
        self.lexeme
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.lexeme)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "{:>4}:{:<3} NEWLINE", self.line, self.start),
            TokenKind::Eof => write!(f, "{:>4}:{:<3} EOF", self.line, self.start),
            k => write!(f, "{:>4}:{:<3} {:<12} {}", self.line, self.start, format!("{k:?}"), self.lexeme),
        }
    }
}

/// Mots réservés.
pub fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "print" => TokenKind::Print,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => return None,
    })
}

/// Symboles d'un caractère.
pub fn symbol(c: u8) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match c {
        b'+' => Plus,
        b'-' => Minus,
        b'*' => Star,
        b'/' => Slash,
        b'%' => Percent,
        b'=' => Equal,
        b'(' => LParen,
        b')' => RParen,
        b'{' => LBrace,
        b'}' => RBrace,
        b'[' => LSquare,
        b']' => RSquare,
        b'!' => Not,
        b'>' => Greater,
        b'<' => Less,
        b',' => Comma,
        b':' => Colon,
        _ => return None,
    })
}

/// Symboles de deux caractères (prioritaires sur les simples).
pub fn double_symbol(pair: [u8; 2]) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match &pair {
        b"==" => EqualEqual,
        b"!=" => NotEqual,
        b">=" => GreaterEqual,
        b"<=" => LessEqual,
        b"&&" => AndAnd,
        b"||" => OrOr,
        b":=" => ColonEqual,
        _ => return None,
    })
}
