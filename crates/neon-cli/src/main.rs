use std::process::ExitCode;

use clap::{Parser, Subcommand};

pub mod commands;
mod util;

#[derive(Parser)]
#[command(name = "neon", version = neon_runtime::VERSION, about = "CLI du langage neon", long_about = None)]
pub struct Cli {
    /// Verbosité (répéter pour plus de bruit ; RUST_LOG reste prioritaire)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Couleur des diagnostics : auto|always|never (équiv. NEON_COLOR)
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Exécuter un fichier .ne via l'interpréteur
    Run(commands::run::Args),

    /// Compiler en C (et en natif avec --native)
    Build(commands::build::Args),

    /// Vérifier un fichier sans rien produire
    Check(commands::check::Args),

    /// Afficher les tokens
    Tokens(commands::tokens::Args),

    /// Afficher l'AST (arbre ou JSON)
    Ast(commands::ast::Args),

    /// Lancer les tests (// EXPECT:)
    Test(commands::test::Args),

    /// Générer autocomplétions shell
    Completions(commands::completions::Args),
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    util::init_logging(cli.verbose);
    let ctx = util::Ctx::load(cli.color.as_deref())?;

    match cli.cmd {
        Cmd::Run(a)         => commands::run::exec(&ctx, a),
        Cmd::Build(a)       => commands::build::exec(&ctx, a),
        Cmd::Check(a)       => commands::check::exec(&ctx, a),
        Cmd::Tokens(a)      => commands::tokens::exec(&ctx, a),
        Cmd::Ast(a)         => commands::ast::exec(&ctx, a),
        Cmd::Test(a)        => commands::test::exec(&ctx, a),
        Cmd::Completions(a) => commands::completions::exec(a),
    }
}
