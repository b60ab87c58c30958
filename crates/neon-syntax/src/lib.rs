//! neon-syntax — Frontend du langage neon
//!
//! ## Modules
//! - `token`       : `TokenKind`, `Token`, tables mots-clés/symboles.
//! - `lexer`       : `tokenize` (texte → tokens, sauts de ligne significatifs).
//! - `ast`         : `Program`, `Stmt`, `Expr`, `Type`.
//! - `parser`      : `parse`, `parse_source` (tokens → AST).
//! - `diagnostics` : `SyntaxError` et son rendu avec soulignement.
//! - `pretty`      : dump arborescent de l'AST.
//!
//! Feature `serde` : (dé)sérialisation des tokens et de l'AST.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod token;

// ---------- Reexports de confort ----------
pub use ast::{Kind, Program, Stmt, StmtKind, Type};
pub use diagnostics::SyntaxError;
pub use lexer::tokenize;
pub use parser::{parse, parse_source};
pub use token::{Token, TokenKind};
