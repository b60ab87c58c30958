use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;
use neon_syntax::{parse_source, pretty};

use crate::util::{self, Ctx};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source .ne
    pub file: Utf8PathBuf,
    /// Sortie JSON (serde) au lieu de l'arbre indenté
    #[arg(long)]
    pub json: bool,
}

pub fn exec(ctx: &Ctx, args: Args) -> Result<ExitCode> {
    let src = util::read(&args.file)?;
    let program = match parse_source(&src) {
        Ok(p) => p,
        Err(e) => {
            eprint!("{}", e.render(ctx.color));
            return Ok(ExitCode::FAILURE);
        }
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        print!("{}", pretty::dump(&program));
    }
    Ok(ExitCode::SUCCESS)
}
