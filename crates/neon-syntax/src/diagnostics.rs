//! diagnostics.rs — Erreurs de syntaxe neon
//!
//! Rendu :
//! ```text
//! error: unterminated string, line 3
//!  3 | x := "abc
//!    |      ^^^^
//! ```

use thiserror::Error;

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}, line {line}")]
pub struct SyntaxError {
    pub msg: String,
    pub line: u32,
    /// Colonnes 0-based (octets) du fragment fautif.
    pub start: u32,
    pub end: u32,
    /// Ligne source complète (vide si inconnue).
    pub source_line: String,
}

impl SyntaxError {
    pub fn new(msg: impl Into<String>, line: u32, start: u32, end: u32) -> Self {
        Self { msg: msg.into(), line, start, end, source_line: String::new() }
    }

    /// Renseigne `source_line` depuis la source complète si elle manque.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        if self.source_line.is_empty() {
            let idx = self.line.saturating_sub(1) as usize;
            if let Some(l) = source.lines().nth(idx) {
                self.source_line = l.to_string();
            }
        }
        self
    }

    /// Rendu complet, avec la ligne fautive et le soulignement.
    pub fn render(&self, color: bool) -> String {
        let paint = |s: &str| if color { format!("{RED}{s}{RESET}") } else { s.to_string() };
        let mut s = format!("{} {}, line {}\n", paint("error:"), self.msg, self.line);
        if self.source_line.is_empty() {
            return s;
        }
        let gutter = " ".repeat(self.line.to_string().len());
        let (start, caret) = self.caret_span();
        s.push_str(&format!(" {} | {}\n", self.line, self.source_line.replace('\t', "    ")));
        s.push_str(&format!(
            " {gutter} | {}\n",
            paint(&format!("{}{}", " ".repeat(start), "^".repeat(caret)))
        ));
        s
    }

    // Décale les colonnes pour les tabulations rendues sur 4 espaces.
    fn caret_span(&self) -> (usize, usize) {
        let bytes = self.source_line.as_bytes();
        let visual = |col: usize| -> usize {
            let col = col.min(bytes.len());
            let tabs = bytes[..col].iter().filter(|&&b| b == b'\t').count();
            col + tabs * 3
        };
        let start = visual(self.start as usize);
        let end = visual(self.end as usize);
        (start, end.saturating_sub(start).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_caret_under_fragment() {
        let e = SyntaxError::new("bad", 2, 5, 8).with_source("a\nx := @@@\n");
        assert_eq!(e.render(false), "error: bad, line 2\n 2 | x := @@@\n   |      ^^^\n");
    }

    #[test]
    fn tabs_expand_to_four_spaces() {
        let e = SyntaxError::new("bad", 1, 1, 2).with_source("\t?");
        assert_eq!(e.render(false), "error: bad, line 1\n 1 |     ?\n   |     ^\n");
    }

    #[test]
    fn empty_span_still_gets_one_caret() {
        let e = SyntaxError::new("eof", 1, 3, 3).with_source("abc");
        assert!(e.render(false).ends_with("   ^\n"));
    }

    #[test]
    fn display_is_short_form() {
        assert_eq!(SyntaxError::new("oops", 7, 0, 0).to_string(), "oops, line 7");
    }
}
