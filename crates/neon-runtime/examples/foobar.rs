//! Programme utilisateur écrit à la main contre le runtime :
//!
//!   cargo run -p neon-runtime --example foobar

use std::process::ExitCode;

use neon_runtime::{from_fn, run_main, string_add, Text};

fn main() -> ExitCode {
    run_main(from_fn(|rt| {
        let mut greeting = Text::from("foo");
        string_add(&mut greeting, &Text::from("bar"));
        rt.println(&greeting)
    }))
}
