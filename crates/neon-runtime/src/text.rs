//! text.rs — Tampon de texte neon
//!
//! Une chaîne neon est une suite d'octets. Côté C elle se termine par un
//! NUL et `string_add` fait confiance à l'appelant pour la capacité ; ici le
//! tampon est possédé et gère lui-même sa croissance (réallocation amortie).
//!
//! Règles :
//! - Aucun terminateur n'est stocké.
//! - Construire un `Text` depuis des octets bruts s'arrête au premier NUL.
//! - `string_add(a, b)` ajoute `b` à la fin de `a`, en place, et rend `a`.

use std::borrow::Cow;
use std::fmt;

#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Text {
    bytes: Vec<u8>,
}

impl Text {
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Tampon vide avec au moins `cap` octets de réserve.
    pub fn with_capacity(cap: usize) -> Self {
        Self { bytes: Vec::with_capacity(cap) }
    }

    /// Copie `raw` jusqu'au premier NUL (exclu).
    pub fn from_bytes(raw: &[u8]) -> Self {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Self { bytes: raw[..end].to_vec() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Ajoute le contenu de `other` (append en place).
    pub fn push_text(&mut self, other: &Text) -> &mut Self {
        self.bytes.extend_from_slice(&other.bytes);
        self
    }

    /// Ajoute des octets bruts, en s'arrêtant au premier NUL.
    pub fn push_bytes(&mut self, raw: &[u8]) -> &mut Self {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        self.bytes.extend_from_slice(&raw[..end]);
        self
    }

    pub fn push_str(&mut self, s: &str) -> &mut Self {
        self.push_bytes(s.as_bytes())
    }

    /// Vue UTF-8 (remplace les séquences invalides).
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Concatène `b` à la fin de `a`, en place, et renvoie `a`.
///
/// La capacité de `a` grandit au besoin : il n'y a plus de précondition
/// sur la taille du tampon de destination.
pub fn string_add<'a>(a: &'a mut Text, b: &Text) -> &'a mut Text {
    log::trace!("string_add: {} + {} octets (cap {})", a.len(), b.len(), a.capacity());
    a.push_text(b)
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        let mut bytes = s.into_bytes();
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }
        Self { bytes }
    }
}

impl From<&[u8]> for Text {
    fn from(raw: &[u8]) -> Self {
        Self::from_bytes(raw)
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text({:?})", self.to_string_lossy())
    }
}

/* --------------------------------- Tests --------------------------------- */
