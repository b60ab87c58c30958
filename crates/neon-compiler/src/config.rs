//! config.rs — Configuration du compilateur neon
//!
//! Couches, de la plus faible à la plus forte :
//! 1. valeurs par défaut (`CompilerConfig::default()`)
//! 2. fichier `neon.toml`, section `[build]`
//! 3. environnement (`NEON_*`)
//! 4. overrides CLI (`CliOverrides`)
//!
//! ENV supportés (tous facultatifs) :
//!   NEON_CC=<binaire du compilateur C>
//!   NEON_OUT_DIR=<dossier des artefacts>
//!   NEON_COLOR=auto|always|never
//!   NEON_MAX_DEPTH=<usize>
//!
//! Exemple de `neon.toml` :
//! ```toml
//! [build]
//! cc = "clang"
//! cflags = ["-O2", "-Wall"]
//! out_dir = "build"
//! color = "never"
//! max_call_depth = 256
//! ```

use std::fs;

use anyhow::{bail, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Nom du fichier de configuration projet.
pub const CONFIG_FILE: &str = "neon.toml";

/* ─────────────────────────── Types publics ─────────────────────────── */

/// Mode couleur des diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Couleur effective, `is_tty` décidant du cas `Auto`.
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            Self::Auto => is_tty,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compilateur C utilisé par `build --native`.
    pub cc: String,
    /// Options passées au compilateur C.
    pub cflags: Vec<String>,
    /// Dossier des artefacts (`.c`, exécutables).
    pub out_dir: Utf8PathBuf,
    pub color: ColorMode,
    /// Profondeur d'appel maximale de l'interpréteur.
    pub max_call_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cc: "cc".into(),
            cflags: vec!["-O2".into()],
            out_dir: Utf8PathBuf::from("target/neon"),
            color: ColorMode::Auto,
            max_call_depth: 1024,
        }
    }
}

/// Section `[build]` de `neon.toml` ; chaque champ absent garde la valeur courante.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub cc: Option<String>,
    pub cflags: Option<Vec<String>>,
    pub out_dir: Option<Utf8PathBuf>,
    pub color: Option<ColorMode>,
    pub max_call_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    build: BuildSection,
}

/// Overrides "dernier mot" fournis par la CLI.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub cc: Option<String>,
    pub out_dir: Option<Utf8PathBuf>,
    pub color: Option<ColorMode>,
    pub max_call_depth: Option<usize>,
}

/* ─────────────────────────── Chargement ─────────────────────────── */

impl CompilerConfig {
    /// Défauts → `<dir>/neon.toml` (s'il existe) → ENV.
    pub fn load(dir: &Utf8Path) -> Result<Self> {
        let mut cfg = Self::default();
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            cfg.apply_file(&path)?;
        }
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn apply_file(&mut self, path: &Utf8Path) -> Result<()> {
        let text = fs::read_to_string(path).with_context(|| format!("lecture de {path}"))?;
        self.apply_toml_str(&text).with_context(|| format!("configuration invalide dans {path}"))?;
        log::debug!("config: {path} appliqué");
        Ok(())
    }

    pub fn apply_toml_str(&mut self, text: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(text)?;
        let b = file.build;
        if let Some(x) = b.cc { self.cc = x; }
        if let Some(x) = b.cflags { self.cflags = x; }
        if let Some(x) = b.out_dir { self.out_dir = x; }
        if let Some(x) = b.color { self.color = x; }
        if let Some(x) = b.max_call_depth { self.max_call_depth = x; }
        Ok(())
    }

    /// Applique les variables d'environnement `NEON_*`.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Variante testable : `get` remplace la lecture de l'environnement.
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("NEON_CC") { if !v.trim().is_empty() { self.cc = v.trim().to_string(); } }
        if let Some(v) = get("NEON_OUT_DIR") { if !v.trim().is_empty() { self.out_dir = Utf8PathBuf::from(v.trim()); } }
        if let Some(v) = get("NEON_COLOR") {
            match parse_color(&v) {
                Some(c) => self.color = c,
                None => log::warn!("NEON_COLOR ignoré : valeur inconnue '{v}'"),
            }
        }
        if let Some(v) = get("NEON_MAX_DEPTH") {
            match v.trim().parse::<usize>() {
                Ok(n) => self.max_call_depth = n,
                Err(_) => log::warn!("NEON_MAX_DEPTH ignoré : '{v}' n'est pas un entier"),
            }
        }
    }

    pub fn apply_cli_overrides(&mut self, o: &CliOverrides) {
        if let Some(x) = &o.cc { self.cc.clone_from(x); }
        if let Some(x) = &o.out_dir { self.out_dir.clone_from(x); }
        if let Some(x) = o.color { self.color = x; }
        if let Some(x) = o.max_call_depth { self.max_call_depth = x; }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_call_depth == 0 {
            bail!("max_call_depth doit être > 0");
        }
        if self.cc.trim().is_empty() {
            bail!("cc ne peut pas être vide");
        }
        Ok(())
    }
}

pub fn parse_color(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" => Some(ColorMode::Always),
        "never" => Some(ColorMode::Never),
        _ => None,
    }
}

/* ───────────────────────────── Tests ───────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_sane() {
        let c = CompilerConfig::default();
        assert_eq!(c.cc, "cc");
        assert_eq!(c.max_call_depth, 1024);
        assert_eq!(c.color, ColorMode::Auto);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_layer_overrides_only_present_keys() {
        let mut c = CompilerConfig::default();
        c.apply_toml_str("[build]\ncc = \"clang\"\ncolor = \"never\"\n").unwrap();
        assert_eq!(c.cc, "clang");
        assert_eq!(c.color, ColorMode::Never);
        assert_eq!(c.max_call_depth, 1024);

        assert!(c.apply_toml_str("[build]\nunknown = 1\n").is_err());
        assert!(c.apply_toml_str("").is_ok());
    }

    #[test]
    fn env_layer() {
        let env: HashMap<&str, &str> =
            [("NEON_CC", "tcc"), ("NEON_MAX_DEPTH", "12"), ("NEON_COLOR", "ALWAYS"), ("NEON_OUT_DIR", " out ")].into();
        let mut c = CompilerConfig::default();
        c.apply_env_with(|k| env.get(k).map(ToString::to_string));
        assert_eq!(c.cc, "tcc");
        assert_eq!(c.max_call_depth, 12);
        assert_eq!(c.color, ColorMode::Always);
        assert_eq!(c.out_dir, Utf8PathBuf::from("out"));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut c = CompilerConfig::default();
        c.apply_env_with(|k| match k {
            "NEON_MAX_DEPTH" => Some("lots".into()),
            "NEON_COLOR" => Some("purple".into()),
            _ => None,
        });
        assert_eq!(c, CompilerConfig::default());
    }

    #[test]
    fn cli_overrides_last_word() {
        let mut c = CompilerConfig::default();
        c.apply_toml_str("[build]\nmax_call_depth = 5\n").unwrap();
        c.apply_cli_overrides(&CliOverrides { max_call_depth: Some(7), ..CliOverrides::default() });
        assert_eq!(c.max_call_depth, 7);
    }

    #[test]
    fn validate_rejects_zero_depth() {
        let c = CompilerConfig { max_call_depth: 0, ..CompilerConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn color_mode() {
        assert!(ColorMode::Auto.enabled(true));
        assert!(!ColorMode::Auto.enabled(false));
        assert!(ColorMode::Always.enabled(false));
        assert_eq!(parse_color("weird"), None);
    }

    #[test]
    fn load_reads_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join(CONFIG_FILE), "[build]\ncflags = [\"-O0\", \"-g\"]\n").unwrap();
        let c = CompilerConfig::load(&root).unwrap();
        assert_eq!(c.cflags, vec!["-O0".to_string(), "-g".to_string()]);
    }
}
