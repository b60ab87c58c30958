use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;
use neon_compiler::CliOverrides;

use crate::util::{self, Ctx};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source .ne
    pub file: Utf8PathBuf,
    /// Dossier de sortie (équiv. NEON_OUT_DIR)
    #[arg(long)]
    pub out_dir: Option<Utf8PathBuf>,
    /// Compiler aussi le C en exécutable (compilateur : NEON_CC)
    #[arg(long)]
    pub native: bool,
}

pub fn exec(ctx: &Ctx, args: Args) -> Result<ExitCode> {
    let compiler = ctx.compiler(&CliOverrides { out_dir: args.out_dir, ..CliOverrides::default() })?;

    let built = if args.native {
        compiler.build_native(&args.file).map(|a| (a.c_file, a.exe))
    } else {
        compiler.build_c(&args.file).map(|c| (c, None))
    };
    match built {
        Ok((c_file, exe)) => {
            println!("{c_file}");
            if let Some(exe) = exe {
                println!("{exe}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            util::print_error(&e, ctx.color);
            Ok(ExitCode::FAILURE)
        }
    }
}
