use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use indoc::indoc;
use pretty_assertions::assert_eq;

const FOOBAR: &str = indoc! {r#"
    func main() {
        greeting: string = "foo"
        string_add(greeting, "bar")
        println(greeting)
    }
"#};

/// Lance `neon` dans `dir`, sans couleur ni configuration héritée.
fn neon(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_neon"))
        .args(args)
        .current_dir(dir)
        .env("NEON_COLOR", "never")
        .env_remove("NEON_CC")
        .env_remove("NEON_OUT_DIR")
        .env_remove("NEON_MAX_DEPTH")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

#[test]
fn run_prints_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("foobar.ne"), FOOBAR).unwrap();
    let o = neon(dir.path(), &["run", "foobar.ne"]);
    assert_eq!(stdout(&o), "foobar\n");
    assert_eq!(o.status.code(), Some(0));
}

#[test]
fn run_propagates_main_return_value() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("exit.ne"), "func main(): int {\n    return 3\n}\n").unwrap();
    let o = neon(dir.path(), &["run", "exit.ne"]);
    assert_eq!(o.status.code(), Some(3));
}

#[test]
fn run_runtime_error_exits_one_after_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("div.ne"), "func main() {\n    println(\"a\")\n    print 1 / 0\n}\n").unwrap();
    let o = neon(dir.path(), &["run", "div.ne"]);
    assert_eq!(stdout(&o), "a\n");
    assert_eq!(o.status.code(), Some(1));
    assert!(stderr(&o).contains("error: division by zero, line 3"), "{}", stderr(&o));
}

#[test]
fn run_syntax_error_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.ne"), "x := \"abc\n").unwrap();
    let o = neon(dir.path(), &["run", "bad.ne"]);
    assert_eq!(o.status.code(), Some(1));
    assert_eq!(stderr(&o), "error: unterminated string, line 1\n 1 | x := \"abc\n   |      ^^^^\n");
}

#[test]
fn check_and_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.ne"), FOOBAR).unwrap();

    let o = neon(dir.path(), &["check", "prog.ne"]);
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "ok: prog.ne\n");

    let o = neon(dir.path(), &["build", "prog.ne", "--out-dir", "gen"]);
    assert_eq!(o.status.code(), Some(0), "{}", stderr(&o));
    let c = fs::read_to_string(dir.path().join("gen").join("prog.c")).unwrap();
    assert!(c.contains("void neon_main(void)"));
}

#[test]
fn check_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("nomain.ne"), "x := 1\n").unwrap();
    let o = neon(dir.path(), &["check", "nomain.ne"]);
    assert_eq!(o.status.code(), Some(1));
    assert!(stderr(&o).contains("nomain.ne:1: error: no entry point"));
}

#[test]
fn config_file_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("neon.toml"), "[build]\nout_dir = \"from-toml\"\n").unwrap();
    fs::write(dir.path().join("p.ne"), FOOBAR).unwrap();
    let o = neon(dir.path(), &["build", "p.ne"]);
    assert_eq!(o.status.code(), Some(0), "{}", stderr(&o));
    assert!(dir.path().join("from-toml").join("p.c").is_file());
}

#[test]
fn tokens_and_ast_dumps() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("p.ne"), "x := 1 + 2\n").unwrap();

    let o = neon(dir.path(), &["tokens", "p.ne"]);
    let out = stdout(&o);
    assert!(out.contains("ColonEqual"));
    assert!(out.trim_end().ends_with("EOF"));

    let o = neon(dir.path(), &["ast", "p.ne"]);
    assert_eq!(stdout(&o), "Declare x :=\n  Binary +\n    Literal 1\n    Literal 2\n");

    let o = neon(dir.path(), &["ast", "--json", "p.ne"]);
    let json: serde_json::Value = serde_json::from_slice(&o.stdout).unwrap();
    assert_eq!(json["stmts"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_runner_counts_pass_and_fail() {
    let dir = tempfile::tempdir().unwrap();
    let suite = dir.path().join("suite");
    fs::create_dir_all(suite.join("nested")).unwrap();
    fs::write(suite.join("pass.ne"), format!("{FOOBAR}// EXPECT: foobar\n")).unwrap();
    fs::write(suite.join("nested").join("fail.ne"), "func main() {\n    print 2\n}\n// EXPECT: 3\n").unwrap();
    fs::write(suite.join("skip.ne"), "func main() {\n}\n").unwrap();

    let o = neon(dir.path(), &["test", "suite"]);
    assert_eq!(o.status.code(), Some(1));
    assert!(stdout(&o).contains("✅"));
    assert!(stderr(&o).contains("Tests OK: 1, KO: 1"));
}

#[test]
fn completions_for_bash() {
    let dir = tempfile::tempdir().unwrap();
    let o = neon(dir.path(), &["completions", "--shell", "bash"]);
    assert_eq!(o.status.code(), Some(0));
    assert!(stdout(&o).contains("neon"));
}

#[test]
fn completions_written_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let o = neon(dir.path(), &["completions", "--shell", "zsh", "--out-dir", "comp"]);
    assert_eq!(o.status.code(), Some(0), "{}", stderr(&o));
    let script = dir.path().join("comp").join("_neon");
    assert!(script.is_file());
    assert!(stdout(&o).trim_end().ends_with("_neon"));
}

#[test]
fn bundled_programs_pass() {
    let dir = tempfile::tempdir().unwrap();
    let programs = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("programs");
    let o = neon(dir.path(), &["test", programs.to_str().unwrap()]);
    assert_eq!(o.status.code(), Some(0), "{}", stderr(&o));
    assert!(stderr(&o).contains("Tests OK: 3, KO: 0"));
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = format!("func main() {{\n    print {}1{}\n}}\n", "(".repeat(50_000), ")".repeat(50_000));
    fs::write(dir.path().join("deep.ne"), src).unwrap();
    for cmd in ["check", "run"] {
        let o = neon(dir.path(), &[cmd, "deep.ne"]);
        assert_eq!(o.status.code(), Some(1), "{cmd}: {}", stderr(&o));
        assert!(stderr(&o).contains("expression nested too deeply"), "{cmd}: {}", stderr(&o));
    }
}

#[test]
fn version_comes_from_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let o = neon(dir.path(), &["--version"]);
    assert_eq!(stdout(&o), format!("neon {}\n", neon_runtime::VERSION));
}
