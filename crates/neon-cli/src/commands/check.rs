use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;
use neon_compiler::{CliOverrides, Severity};

use crate::util::{self, Ctx};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source .ne
    pub file: Utf8PathBuf,
}

pub fn exec(ctx: &Ctx, args: Args) -> Result<ExitCode> {
    let src = util::read(&args.file)?;
    let diags = ctx.compiler(&CliOverrides::default())?.check_str(&src);

    let mut errors = 0usize;
    for d in diags {
        if d.severity == Severity::Error {
            errors += 1;
        }
        eprintln!("{}", d.in_file(args.file.as_str()));
    }
    if errors > 0 {
        eprintln!("{} {}: {errors} erreur(s)", util::paint_error(ctx.color), args.file);
        return Ok(ExitCode::FAILURE);
    }
    println!("ok: {}", args.file);
    Ok(ExitCode::SUCCESS)
}
