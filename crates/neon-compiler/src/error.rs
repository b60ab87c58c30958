use neon_syntax::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{what} is not supported by the C backend, line {line}")]
    Unsupported { what: &'static str, line: u32 },

    #[error("cannot infer type of '{name}', line {line}")]
    CannotInfer { name: String, line: u32 },

    #[error("{msg}, line {line}")]
    Semantic { msg: String, line: u32 },
}

impl CompileError {
    pub fn semantic(msg: impl Into<String>, line: u32) -> Self {
        Self::Semantic { msg: msg.into(), line }
    }

    /// Message sans la mention de ligne.
    pub fn detail(&self) -> String {
        match self {
            Self::Syntax(e) => e.msg.clone(),
            Self::Unsupported { what, .. } => format!("{what} is not supported by the C backend"),
            Self::CannotInfer { name, .. } => format!("cannot infer type of '{name}'"),
            Self::Semantic { msg, .. } => msg.clone(),
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Self::Syntax(e) => e.line,
            Self::Unsupported { line, .. } | Self::CannotInfer { line, .. } | Self::Semantic { line, .. } => *line,
        }
    }
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_drops_line_suffix() {
        let e = CompileError::Unsupported { what: "indexing", line: 9 };
        assert_eq!(e.to_string(), "indexing is not supported by the C backend, line 9");
        assert_eq!(e.detail(), "indexing is not supported by the C backend");
        assert_eq!(e.line(), 9);
    }
}
