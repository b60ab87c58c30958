//! io.rs — Poignée de runtime et `println`
//!
//! `Runtime` porte la sortie du programme : n'importe quel `io::Write`.
//! Le point d'entrée la branche sur `stdout`, les tests sur un `Vec<u8>`.

use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::text::Text;

pub struct Runtime<'out> {
    out: &'out mut dyn Write,
    lines: u64,
}

impl<'out> Runtime<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        Self { out, lines: 0 }
    }

    /// Écrit `msg` puis exactement un `\n`. Aucun échappement.
    pub fn println(&mut self, msg: &Text) -> Result<()> {
        self.out.write_all(msg.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Nombre de lignes écrites depuis la création.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl fmt::Debug for Runtime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("lines", &self.lines).finish_non_exhaustive()
    }
}

/// Forme libre de `Runtime::println`.
pub fn println(rt: &mut Runtime<'_>, msg: &Text) -> Result<()> {
    rt.println(msg)
}
