use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, CommandFactory};
use clap_complete::{generate, generate_to, Shell};
use color_eyre::eyre::{eyre, Result};

const BIN: &str = "neon";

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Shell cible (défaut : déduit de $SHELL)
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,

    /// Écrire le script dans ce dossier plutôt que sur stdout
    #[arg(long)]
    pub out_dir: Option<Utf8PathBuf>,
}

pub fn exec(args: Args) -> Result<ExitCode> {
    let shell = args
        .shell
        .or_else(Shell::from_env)
        .ok_or_else(|| eyre!("shell non détecté depuis $SHELL : préciser --shell"))?;
    let mut cmd = crate::Cli::command();

    match args.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let path = generate_to(shell, &mut cmd, BIN, dir)?;
            log::info!("complétions {shell} écrites");
            println!("{}", path.display());
        }
        None => generate(shell, &mut cmd, BIN, &mut io::stdout()),
    }
    Ok(ExitCode::SUCCESS)
}
