pub mod ast;
pub mod build;
pub mod check;
pub mod completions;
pub mod run;
pub mod tokens;
