/// Command-line tests: run chevron programs through the built binary and
/// check what it prints.
///
/// Each case pipes a program to `chevron -f` (rc file skipped) on stdin, or
/// passes it as a file, and compares stdout line by line.  Warnings and errors
/// go to stderr and are checked separately.

use std::io::Write;
use std::process::{Command, Output, Stdio};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Path to the `chevron` binary built by this Cargo workspace.
fn binary() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_chevron"))
}

/// Run the binary with `args`, feeding `stdin` to it.
fn run(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(binary())
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn chevron binary");
    child
        .stdin
        .as_mut()
        .expect("stdin not open")
        .write_all(stdin.as_bytes())
        .expect("write to stdin");
    child.wait_with_output().expect("wait failed")
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes).lines().map(str::to_owned).collect()
}

/// Pipe `program` through `chevron -f` and compare stdout with `expected`.
fn check(program: &str, expected: &[&str]) {
    let out = run(&["-f"], program);
    let got = lines(&out.stdout);
    assert!(
        out.status.success(),
        "exit status {:?}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(got, expected, "\nProgram:\n{program}\nGot:\n{got:#?}");
}

const SECRET_PROGRAM: &str = r#"
funcwithsecret > {
    secret > "hello world"
    true > arg0 > arg1 > @secret
}
getsecret > {
    value >= funcwithsecret > true
    true > systemPrint > @value
}
getsecret > true
"#;

// ── Test cases ────────────────────────────────────────────────────────────────

#[test]
fn secret_program_prints_once() {
    check(SECRET_PROGRAM, &["hello world"]);
}

#[test]
fn print_literals() {
    check("systemPrint > hello\nsystemPrint > 12", &["hello", "12"]);
}

#[test]
fn dangling_route_prints_nothing() {
    check("nowhere > go > a > b\nsystemPrint > after", &["after"]);
}

#[test]
fn comments_ignored() {
    check("# a comment\nsystemPrint > x\n# trailing", &["x"]);
}

#[test]
fn program_from_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(SECRET_PROGRAM.as_bytes()).unwrap();
    let path = f.path().to_str().unwrap();
    let out = run(&["-f", path], "");
    assert!(out.status.success());
    assert_eq!(lines(&out.stdout), vec!["hello world"]);
}

#[test]
fn command_runs_after_program() {
    let out = run(&["-f", "-c", "getsecret > true"], SECRET_PROGRAM);
    assert!(out.status.success());
    assert_eq!(lines(&out.stdout), vec!["hello world", "hello world"]);
}

#[test]
fn strict_flag_warns_on_stderr() {
    let out = run(&["-f", "-S"], "nowhere > go");
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(lines(&out.stderr), vec!["% no route for 'nowhere > go'"]);
}

#[test]
fn block_scope_flag() {
    let out = run(&["-f", "-s"], SECRET_PROGRAM);
    assert!(out.status.success());
    assert_eq!(lines(&out.stdout), vec!["none"]);
}

#[test]
fn parse_error_exits_nonzero() {
    let out = run(&["-f"], "broken > {\n  a > b\n");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("unbalanced braces"), "stderr: {err}");
}

#[test]
fn recursion_limit_exits_nonzero() {
    let out = run(&["-f", "-D10"], "spin > {\n  go > spin > go\n}\nspin > go");
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("recursion limit (10) exceeded"), "stderr: {err}");
}

#[test]
fn rc_file_applies_settings() {
    let mut rc = tempfile::NamedTempFile::new().unwrap();
    writeln!(rc, "# test settings").unwrap();
    writeln!(rc, "strict = true").unwrap();
    let rc_arg = format!("-f{}", rc.path().display());
    let out = run(&[&rc_arg], "nowhere > go");
    assert!(out.status.success());
    assert_eq!(lines(&out.stderr), vec!["% no route for 'nowhere > go'"]);
}

#[test]
fn rc_file_errors_are_reported_not_fatal() {
    let mut rc = tempfile::NamedTempFile::new().unwrap();
    writeln!(rc, "colour = red").unwrap();
    let rc_arg = format!("-f{}", rc.path().display());
    let out = run(&[&rc_arg], "systemPrint > ok");
    assert!(out.status.success());
    assert_eq!(lines(&out.stdout), vec!["ok"]);
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("line 1: unknown setting `colour`"), "stderr: {err}");
}

#[test]
fn bad_option_exits_nonzero() {
    let out = run(&["-z"], "");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown option: -z"));
}
