//! tests/entry.rs — scénarios bout-en-bout du point d'entrée
//!
//!   cargo test -p neon-runtime

use neon_runtime::{
    execute, from_fn, string_add, ExitStatus, Runtime, RuntimeError, Text, UserProgram,
};
use pretty_assertions::assert_eq;

fn run_capture<P: UserProgram>(mut p: P) -> (Result<ExitStatus, RuntimeError>, String) {
    let mut out = Vec::new();
    let res = execute(&mut p, &mut out);
    (res, String::from_utf8(out).unwrap())
}

#[test]
fn hello_prints_one_line_and_succeeds() {
    let (res, out) = run_capture(from_fn(|rt| rt.println(&Text::from("hello"))));
    assert_eq!(res.unwrap(), ExitStatus::SUCCESS);
    assert_eq!(out, "hello\n");
}

#[test]
fn concat_then_print() {
    let (res, out) = run_capture(from_fn(|rt| {
        let mut a = Text::from("foo");
        string_add(&mut a, &Text::from("bar"));
        rt.println(&a)
    }));
    assert!(res.unwrap().is_success());
    assert_eq!(out, "foobar\n");
}

#[test]
fn empty_program_is_silent_success() {
    let (res, out) = run_capture(from_fn(|_rt| Ok(())));
    assert_eq!(res.unwrap(), ExitStatus::SUCCESS);
    assert!(out.is_empty());
}

#[test]
fn error_maps_to_failure_and_keeps_output() {
    let (res, out) = run_capture(from_fn(|rt| {
        rt.println(&Text::from("before"))?;
        Err(RuntimeError::msg("nope"))
    }));
    let err = res.unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::FAILURE);
    assert_eq!(out, "before\n");
}

#[test]
fn panic_is_caught() {
    let (res, _) = run_capture(from_fn(|_rt| -> neon_runtime::Result<()> {
        panic!("kaboom");
    }));
    match res.unwrap_err() {
        RuntimeError::Panicked(msg) => assert!(msg.contains("kaboom")),
        other => panic!("attendu Panicked, got {other:?}"),
    }
}

struct Exits(u8);
impl UserProgram for Exits {
    fn run(&mut self, rt: &mut Runtime<'_>) -> neon_runtime::Result<ExitStatus> {
        rt.println(&Text::from("bye"))?;
        Ok(ExitStatus::new(self.0))
    }
}

#[test]
fn explicit_status_is_reported() {
    let (res, out) = run_capture(Exits(3));
    assert_eq!(res.unwrap().code(), 3);
    assert_eq!(out, "bye\n");
}

#[test]
fn boxed_programs_run() {
    let p: Box<dyn UserProgram> = Box::new(Exits(0));
    let (res, _) = run_capture(p);
    assert!(res.unwrap().is_success());
}
