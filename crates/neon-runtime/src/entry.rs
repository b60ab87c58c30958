//! entry.rs — Point d'entrée du processus
//!
//! Le programme utilisateur est appelé une fois, sans argument. Son issue
//! est rapportée au système :
//!
//! | issue                         | statut |
//! |-------------------------------|--------|
//! | `Ok(status)`                  | status |
//! | `Err(RuntimeError)`           | 1      |
//! | panique dans le programme     | 101    |
//!
//! Les arguments du processus sont acceptés mais ignorés à ce niveau.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use crate::error::{ExitStatus, Result, RuntimeError};
use crate::io::Runtime;

/// Le "programme utilisateur" : seul point d'extension du runtime.
pub trait UserProgram {
    fn run(&mut self, rt: &mut Runtime<'_>) -> Result<ExitStatus>;
}

impl<P: UserProgram + ?Sized> UserProgram for Box<P> {
    fn run(&mut self, rt: &mut Runtime<'_>) -> Result<ExitStatus> {
        (**self).run(rt)
    }
}

/// Adaptateur closure → `UserProgram` (voir [`from_fn`]).
pub struct FnProgram<F>(F);

/// Fait d'une closure un programme utilisateur qui termine avec succès
/// lorsqu'elle rend `Ok(())`.
pub fn from_fn<F>(f: F) -> FnProgram<F>
where
    F: FnMut(&mut Runtime<'_>) -> Result<()>,
{
    FnProgram(f)
}

impl<F> UserProgram for FnProgram<F>
where
    F: FnMut(&mut Runtime<'_>) -> Result<()>,
{
    fn run(&mut self, rt: &mut Runtime<'_>) -> Result<ExitStatus> {
        (self.0)(rt)?;
        Ok(ExitStatus::SUCCESS)
    }
}

/// Exécute `program` avec `out` comme sortie.
///
/// Les paniques du programme sont rattrapées et deviennent
/// `RuntimeError::Panicked`. La sortie est vidée dans tous les cas.
pub fn execute<P>(program: &mut P, out: &mut dyn Write) -> Result<ExitStatus>
where
    P: UserProgram + ?Sized,
{
    let mut rt = Runtime::new(out);
    log::debug!("runtime: appel du programme utilisateur");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| program.run(&mut rt)))
        .unwrap_or_else(|payload| Err(RuntimeError::Panicked(panic_message(payload.as_ref()))));
    let flushed = rt.flush();

    log::debug!("runtime: {} ligne(s) écrite(s), issue {:?}", rt.lines_written(), outcome);
    let status = outcome?;
    flushed?;
    Ok(status)
}

/// Point d'entrée processus : branche `stdout`, exécute, mappe l'issue.
///
/// ```no_run
/// use neon_runtime::{from_fn, run_main, Text};
///
/// fn main() -> std::process::ExitCode {
///     run_main(from_fn(|rt| rt.println(&Text::from("hello"))))
/// }
/// ```
pub fn run_main<P: UserProgram>(mut program: P) -> ExitCode {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    match execute(&mut program, &mut lock) {
        Ok(status) => status.into(),
        Err(e) => {
            log::error!("{e}");
            eprintln!("neon: {e}");
            e.exit_status().into()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
