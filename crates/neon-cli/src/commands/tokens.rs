use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;
use neon_syntax::tokenize;

use crate::util::{self, Ctx};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source .ne
    pub file: Utf8PathBuf,
}

pub fn exec(ctx: &Ctx, args: Args) -> Result<ExitCode> {
    let src = util::read(&args.file)?;
    match tokenize(&src) {
        Ok(tokens) => {
            for t in tokens {
                println!("{t}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprint!("{}", e.render(ctx.color));
            Ok(ExitCode::FAILURE)
        }
    }
}
