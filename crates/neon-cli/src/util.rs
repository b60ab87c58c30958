use std::fs;
use std::io::{self, IsTerminal};
use std::thread;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{eyre, Report, Result};
use neon_compiler::config::parse_color;
use neon_compiler::{CliOverrides, CompileError, Compiler, CompilerConfig};
use neon_syntax::SyntaxError;

/// Pile du thread qui interprète les programmes (récursion profonde).
const RUN_STACK: usize = 256 * 1024 * 1024;

pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Contexte commun aux sous-commandes : configuration chargée + couleur effective.
pub struct Ctx {
    pub config: CompilerConfig,
    pub color: bool,
}

impl Ctx {
    /// Défauts → `./neon.toml` → ENV → `--color`.
    pub fn load(color_flag: Option<&str>) -> Result<Self> {
        let mut config = CompilerConfig::load(Utf8Path::new(".")).map_err(from_anyhow)?;
        config.apply_cli_overrides(&CliOverrides { color: color_flag.and_then(parse_color), ..CliOverrides::default() });
        let color = config.color.enabled(io::stderr().is_terminal());
        log::debug!("config: {config:?}");
        Ok(Self { config, color })
    }

    pub fn compiler(&self, overrides: &CliOverrides) -> Result<Compiler> {
        let mut cfg = self.config.clone();
        cfg.apply_cli_overrides(overrides);
        cfg.validate().map_err(from_anyhow)?;
        Ok(Compiler::new(cfg))
    }
}

pub fn from_anyhow(e: anyhow::Error) -> Report {
    eyre!("{e:#}")
}

pub fn read(path: &Utf8Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| eyre!("lecture de {path}: {e}"))
}

/// Exécute `f` sur un thread à grosse pile et rend son résultat.
pub fn on_big_stack<T: Send>(f: impl FnOnce() -> T + Send) -> Result<T> {
    thread::scope(|s| {
        let handle = thread::Builder::new().name("neon-run".into()).stack_size(RUN_STACK).spawn_scoped(s, f)?;
        handle.join().map_err(|_| eyre!("le thread d'exécution a paniqué"))
    })
}

pub fn paint_error(color: bool) -> &'static str {
    if color { "\x1b[91merror:\x1b[0m" } else { "error:" }
}

/// Affiche une erreur de la pipeline ; les erreurs de syntaxe sont rendues
/// avec la ligne fautive.
pub fn print_error(err: &anyhow::Error, color: bool) {
    if let Some(e) = syntax_error(err) {
        eprint!("{}", e.render(color));
        return;
    }
    eprintln!("{} {err:#}", paint_error(color));
}

fn syntax_error(err: &anyhow::Error) -> Option<&SyntaxError> {
    err.chain().find_map(|c| match c.downcast_ref::<CompileError>() {
        Some(CompileError::Syntax(e)) => Some(e),
        _ => c.downcast_ref::<SyntaxError>(),
    })
}

/// Liste récursive (triée) des fichiers `.ne` sous `dir`.
pub fn walk(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut out = vec![];
    for e in dir.read_dir_utf8().map_err(|e| eyre!("lecture de {dir}: {e}"))? {
        let p = e?.into_path();
        if p.is_dir() {
            out.extend(walk(&p)?);
        } else if p.extension() == Some("ne") {
            out.push(p);
        }
    }
    out.sort();
    Ok(out)
}
