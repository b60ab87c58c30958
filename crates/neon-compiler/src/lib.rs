//! neon-compiler — orchestrateur de compilation pour neon.
//! - Pilote la pipeline (source → tokens → AST → C | interprétation).
//! - Backend C autonome (`emit_c`) : le prélude embarque `println` et `string_add`.
//! - Interpréteur (`interp`) branché sur `neon-runtime` via `UserProgram`.
//! - Configuration en couches (défauts → `neon.toml` → ENV → CLI).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod config;
pub mod diagnostics;
pub mod emit_c;
pub mod error;
pub mod interp;
pub mod pipeline;

pub use config::{CliOverrides, ColorMode, CompilerConfig};
pub use diagnostics::{Diagnostic, Severity};
pub use error::CompileError;
pub use interp::{Interpreter, Value};
pub use pipeline::{CompileProduct, Compiler, NativeArtifacts, OutputKind};
