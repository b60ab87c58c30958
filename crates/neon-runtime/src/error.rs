//! Erreurs du runtime et statut de sortie du processus.

use std::fmt;
use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Statut de sortie rapporté au système.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(u8);

impl ExitStatus {
    pub const SUCCESS: Self = Self(0);
    pub const FAILURE: Self = Self(1);
    /// Même code que `std` quand `main` panique.
    pub const PANIC: Self = Self(101);

    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// Ramène un entier quelconque dans `0..=255` (saturation).
    pub fn saturating(code: i64) -> Self {
        Self(u8::try_from(code.clamp(0, 255)).unwrap_or(u8::MAX))
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit status {}", self.0)
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(s: ExitStatus) -> Self {
        ExitCode::from(s.0)
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Échec d'écriture sur la sortie
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Valeur du mauvais type passée à une opération
    #[error("type error: {0}")]
    Type(String),

    /// Variable ou fonction inconnue
    #[error("undefined name `{0}`")]
    Undefined(String),

    /// Le programme utilisateur a paniqué (rattrapé par le point d'entrée)
    #[error("panic in user program: {0}")]
    Panicked(String),

    /// Erreur générique
    #[error("{0}")]
    Msg(String),
}

impl RuntimeError {
    pub fn msg(m: impl Into<String>) -> Self {
        Self::Msg(m.into())
    }

    /// Statut de sortie associé à cette erreur.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Panicked(_) => ExitStatus::PANIC,
            _ => ExitStatus::FAILURE,
        }
    }
}

pub type Result<T, E = RuntimeError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_clamps_both_ends() {
        assert_eq!(ExitStatus::saturating(-3), ExitStatus::SUCCESS);
        assert_eq!(ExitStatus::saturating(42).code(), 42);
        assert_eq!(ExitStatus::saturating(1_000).code(), 255);
    }

    #[test]
    fn panics_map_to_101() {
        assert_eq!(RuntimeError::Panicked("boom".into()).exit_status().code(), 101);
        assert_eq!(RuntimeError::Type("x".into()).exit_status(), ExitStatus::FAILURE);
    }
}
