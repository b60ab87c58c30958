use std::fs;
use std::io::{self, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use neon_runtime::{execute, ExitStatus};
use neon_syntax::ast::{Expr, ExprKind, Program, Stmt, StmtKind};
use neon_syntax::parse_source;

use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostic;
use crate::emit_c::emit_c;
use crate::error::CompileError;
use crate::interp::Interpreter;

/// Bibliothèques à lier après le C généré (`fmod`).
const LINK_LIBS: &[&str] = if cfg!(windows) { &[] } else { &["-lm"] };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Unité de traduction C autonome
    C,
}

impl OutputKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::C => "c",
        }
    }
}

/// Produit compilé (+ diagnostics non bloquants)
#[derive(Debug, Clone)]
pub struct CompileProduct {
    pub output: String,
    pub diags: Vec<Diagnostic>,
}

/// Fichiers produits par `build_native`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeArtifacts {
    pub c_file: Utf8PathBuf,
    /// `None` si le compilateur C est introuvable.
    pub exe: Option<Utf8PathBuf>,
}

/// Orchestrateur principal
pub struct Compiler {
    cfg: CompilerConfig,
}

impl Compiler {
    pub fn new(cfg: CompilerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.cfg
    }

    /// Analyse + lowering C sans rien écrire. Vide = aucun problème.
    pub fn check_str(&self, source: &str) -> Vec<Diagnostic> {
        match self.compile_str(source, OutputKind::C) {
            Ok(product) => product.diags,
            Err(CompileError::Syntax(e)) => vec![Diagnostic::from(&e)],
            Err(e) => vec![Diagnostic::error(e.detail()).at_line(e.line())],
        }
    }

    /// Compile une chaîne en mémoire.
    pub fn compile_str(&self, source: &str, kind: OutputKind) -> Result<CompileProduct, CompileError> {
        let program = parse_source(source)?;
        let output = match kind {
            OutputKind::C => emit_c(&program)?,
        };
        Ok(CompileProduct { output, diags: lint(&program) })
    }

    pub fn compile_file(&self, input: &Utf8Path, kind: OutputKind) -> Result<CompileProduct> {
        let source = read_source(input)?;
        let mut product = self.compile_str(&source, kind).with_context(|| format!("compilation de {input}"))?;
        for d in &mut product.diags {
            d.file = Some(input.to_string());
        }
        Ok(product)
    }

    /// Écrit `<out_dir>/<stem>.c` et retourne son chemin.
    pub fn build_c(&self, input: &Utf8Path) -> Result<Utf8PathBuf> {
        let product = self.compile_file(input, OutputKind::C)?;
        for d in &product.diags {
            log::warn!("{d}");
        }
        let out_dir = &self.cfg.out_dir;
        fs::create_dir_all(out_dir).with_context(|| format!("création de {out_dir}"))?;
        let c_file = out_dir.join(format!("{}.{}", stem(input), OutputKind::C.extension()));
        fs::write(&c_file, product.output).with_context(|| format!("écriture de {c_file}"))?;
        log::info!("C écrit : {c_file}");
        Ok(c_file)
    }

    /// `build_c` puis compilation par le compilateur C configuré.
    /// Sans compilateur C disponible, le fichier C est conservé (avertissement).
    pub fn build_native(&self, input: &Utf8Path) -> Result<NativeArtifacts> {
        let c_file = self.build_c(input)?;
        let exe = self.cfg.out_dir.join(format!("{}{}", stem(input), std::env::consts::EXE_SUFFIX));

        let status = Command::new(&self.cfg.cc)
            .args(&self.cfg.cflags)
            .arg(c_file.as_str())
            .arg("-o")
            .arg(exe.as_str())
            .args(LINK_LIBS)
            .status();
        match status {
            Ok(s) if s.success() => {
                log::info!("exécutable : {exe}");
                Ok(NativeArtifacts { c_file, exe: Some(exe) })
            }
            Ok(s) => bail!("{} a échoué sur {c_file} ({s})", self.cfg.cc),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("{} introuvable ; C conservé dans {c_file}", self.cfg.cc);
                Ok(NativeArtifacts { c_file, exe: None })
            }
            Err(e) => Err(e).with_context(|| format!("lancement de {}", self.cfg.cc)),
        }
    }

    /// Interprète `source`, la sortie du programme allant dans `out`.
    ///
    /// Une erreur d'exécution est rendue telle quelle (`RuntimeError`, via
    /// `downcast_ref`) pour que l'appelant en tire le statut de sortie.
    pub fn run_str(&self, source: &str, out: &mut dyn Write) -> Result<ExitStatus> {
        let program = parse_source(source).map_err(CompileError::from)?;
        let mut interp = Interpreter::new(program).with_max_depth(self.cfg.max_call_depth);
        Ok(execute(&mut interp, out)?)
    }

    pub fn run_file(&self, input: &Utf8Path, out: &mut dyn Write) -> Result<ExitStatus> {
        let source = read_source(input)?;
        self.run_str(&source, out)
    }
}

fn read_source(input: &Utf8Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("lecture de {input}"))
}

fn stem(input: &Utf8Path) -> &str {
    input.file_stem().unwrap_or("out")
}

/* ───────────── Lints ───────────── */

/// Avertit des fonctions jamais appelées (hors `main`).
pub fn lint(program: &Program) -> Vec<Diagnostic> {
    let mut called = Vec::new();
    for s in &program.stmts {
        calls_in_stmt(s, &mut called);
    }
    program
        .stmts
        .iter()
        .filter_map(|s| match &s.kind {
            StmtKind::Func { name, .. } if name != "main" && !called.contains(&name.as_str()) => {
                Some(Diagnostic::warning(format!("function '{name}' is never called")).at_line(s.line))
            }
            _ => None,
        })
        .collect()
}

fn calls_in_stmt<'p>(s: &'p Stmt, acc: &mut Vec<&'p str>) {
    match &s.kind {
        StmtKind::Expr(e) | StmtKind::Print(e) | StmtKind::Return(Some(e)) => calls_in_expr(e, acc),
        StmtKind::Declare { value, .. } | StmtKind::Assign { value, .. } => calls_in_expr(value, acc),
        StmtKind::Func { body, .. } | StmtKind::Block(body) => body.iter().for_each(|s| calls_in_stmt(s, acc)),
        StmtKind::Return(None) => {}
    }
}

fn calls_in_expr<'p>(e: &'p Expr, acc: &mut Vec<&'p str>) {
    match &e.kind {
        ExprKind::Literal(_) | ExprKind::Variable(_) => {}
        ExprKind::Unary { right, .. } => calls_in_expr(right, acc),
        ExprKind::Binary { left, right, .. } | ExprKind::Index { array: left, index: right } => {
            calls_in_expr(left, acc);
            calls_in_expr(right, acc);
        }
        ExprKind::Group(inner) => calls_in_expr(inner, acc),
        ExprKind::Array(items) => items.iter().for_each(|i| calls_in_expr(i, acc)),
        ExprKind::Call { callee, args } => {
            if let Some(name) = callee.as_variable() {
                acc.push(name);
            } else {
                calls_in_expr(callee, acc);
            }
            args.iter().for_each(|a| calls_in_expr(a, acc));
        }
    }
}
