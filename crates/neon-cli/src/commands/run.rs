use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use color_eyre::eyre::Result;
use neon_compiler::CliOverrides;
use neon_runtime::{ExitStatus, RuntimeError};

use crate::util::{self, Ctx};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Fichier source .ne
    pub file: Utf8PathBuf,
    /// Profondeur d'appel maximale (équiv. NEON_MAX_DEPTH)
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Le statut de sortie du processus est celui du programme.
pub fn exec(ctx: &Ctx, args: Args) -> Result<ExitCode> {
    let compiler = ctx.compiler(&CliOverrides { max_call_depth: args.max_depth, ..CliOverrides::default() })?;
    let outcome = util::on_big_stack(|| compiler.run_file(&args.file, &mut io::stdout().lock()))?;
    let status = match outcome {
        Ok(status) => status,
        Err(e) => {
            util::print_error(&e, ctx.color);
            e.downcast_ref::<RuntimeError>().map_or(ExitStatus::FAILURE, RuntimeError::exit_status)
        }
    };
    log::debug!("run: {} → {status}", args.file);
    Ok(status.into())
}
