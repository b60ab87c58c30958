//! neon-runtime — Runtime minimal du langage neon
//!
//! Ce crate est la "colle" entre le processus et le programme utilisateur
//! (généré par le compilateur neon ou interprété) :
//!
//! ## Modules
//! - `text`  : `Text`, tampon d'octets possédé et extensible + `string_add`.
//! - `io`    : `Runtime`, la poignée passée au programme (sortie explicite, `println`).
//! - `number`: `format_float`, l'affichage des flottants commun aux deux backends.
//! - `entry` : `UserProgram`, `execute`, `run_main` (point d'entrée du processus).
//! - `error` : `RuntimeError`, `ExitStatus` (mapping issue → code de sortie).
//!
//! Flot de contrôle :
//! ```text
//! process start → run_main → UserProgram::run(&mut Runtime) → println/string_add* → exit(status)
//! ```
//!
//! Le programme ne touche jamais `stdout` directement : la sortie est une
//! capacité (`&mut dyn Write`) fournie par le point d'entrée, ce qui permet la
//! capture en test et la redirection.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod entry;
pub mod error;
pub mod io;
pub mod number;
pub mod text;

// ---------- Reexports de confort ----------
pub use entry::{execute, from_fn, run_main, FnProgram, UserProgram};
pub use error::{ExitStatus, Result, RuntimeError};
pub use io::{println, Runtime};
pub use number::format_float;
pub use text::{string_add, Text};

/// Version du crate (lisible, via Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nom du symbole "programme utilisateur" attendu par le point d'entrée.
pub const ENTRY_SYMBOL: &str = "neon_main";
