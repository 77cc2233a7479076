//! Integration Tests

extern crate assert_cli;
#[macro_use]
extern crate lazy_static;
extern crate tempdir;

use assert_cli::Assert;
use std::collections::HashMap;
use std::fs::{self, DirEntry};
use std::path::PathBuf;
use tempdir::TempDir;

trait AssertExt {
    fn exit_status_is(self, exit_status: i32) -> Self;
}

impl AssertExt for Assert {
    fn exit_status_is(self, exit_status: i32) -> Self {
        if exit_status == 0 {
            self.succeeds()
        } else {
            self.fails_with(exit_status)
        }
    }
}

struct ScriptData<'a> {
    pub stdout: &'a str,
    pub exit_status: i32,
}

lazy_static! {
    static ref MINSH_SCRIPTS_MAP: HashMap<&'static str, ScriptData<'static>> = {
        let mut map = HashMap::new();
        map.insert("simple_echo.minsh", ScriptData { stdout: "test\n", exit_status: 0 });
        map.insert("simple_quotes.minsh", ScriptData { stdout: "quoted words\n", exit_status: 0 });
        map.insert("simple_exit_error.minsh", ScriptData { stdout: "", exit_status: 1 });
        map.insert("simple_exit_keyword.minsh", ScriptData { stdout: "before\n", exit_status: 0 });
        map.insert("simple_missing_program.minsh", ScriptData {
            stdout: "one\ntwo\n",
            exit_status: 0
        });
        map
    };
}

/// Runs the minsh binary with its log going to `scratch` instead of `~/.minsh_log`.
fn minsh(scratch: &TempDir, args: &[&str]) -> Assert {
    let log_flag = format!("--log={}", scratch.path().join("minsh.log").display());
    let mut all_args = vec![log_flag.as_str()];
    all_args.extend_from_slice(args);
    Assert::cargo_binary("minsh").with_args(&all_args)
}

fn scratch() -> TempDir {
    TempDir::new("minsh").expect("unable to generate temp dir")
}

#[test]
fn test_all_simple_minsh_scripts() {
    let simple_scripts = get_path_to_test_scripts()
        .read_dir()
        .expect("read_dir failed")
        .map(|entry| entry.expect("directory entry should be readable"))
        .filter(is_simple_minsh_script);

    for entry in simple_scripts {
        let temp_dir = scratch();
        let file_path = entry.path();
        let unicode_file_path = file_path.to_str().expect("file path should be valid Unicode");

        let filename = entry.file_name();
        let expected_data = MINSH_SCRIPTS_MAP
            .get(filename.to_str().expect("filename should be valid Unicode"))
            .expect("simple script should have matching data in MINSH_SCRIPTS_MAP");

        minsh(&temp_dir, &[unicode_file_path])
            .stdout()
            .is(expected_data.stdout)
            .exit_status_is(expected_data.exit_status)
            .unwrap();
    }
}

#[test]
fn test_command_string() {
    let temp_dir = scratch();
    minsh(&temp_dir, &["-c", "echo hi there"])
        .stdout()
        .is("hi there\n")
        .succeeds()
        .unwrap();
}

#[test]
fn test_command_string_exit_status() {
    let temp_dir = scratch();
    minsh(&temp_dir, &["-c", "false"]).fails_with(1).unwrap();
    minsh(&temp_dir, &["-c", "/nonexistent/minsh-test-program"])
        .fails_with(127)
        .unwrap();
}

#[test]
fn test_stdin_prints_prompt_and_output() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("echo -n x\nexit\n")
        .stdout()
        .contains("minsh> x")
        .succeeds()
        .unwrap();
}

#[test]
fn test_custom_prompt() {
    let temp_dir = scratch();
    minsh(&temp_dir, &["--prompt=custom%"])
        .stdin("exit\n")
        .stdout()
        .contains("custom%")
        .unwrap();
}

#[test]
fn test_exit_returns_success_after_failure() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("false\nexit\n")
        .succeeds()
        .unwrap();
}

#[test]
fn test_eof_ends_loop() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("echo last\n")
        .stdout()
        .contains("last")
        .succeeds()
        .unwrap();
}

#[test]
fn test_redirect_writes_file_not_stdout() {
    let temp_dir = scratch();
    let out = temp_dir.path().join("out.txt");
    let input = format!("echo redirected output > {}\nexit\n", out.display());

    minsh(&temp_dir, &[])
        .stdin(input.as_str())
        .stdout()
        .doesnt_contain("redirected")
        .succeeds()
        .unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "redirected output\n");
}

#[test]
fn test_redirect_failure_is_reported() {
    let temp_dir = scratch();
    let out = temp_dir.path().join("missing").join("out.txt");
    let input = format!("echo lost > {}\necho kept\nexit\n", out.display());

    minsh(&temp_dir, &[])
        .stdin(input.as_str())
        .stdout()
        .doesnt_contain("lost")
        .stdout()
        .contains("kept")
        .stderr()
        .contains("cannot open for writing")
        .succeeds()
        .unwrap();
}

#[test]
fn test_missing_program_continues() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("/nonexistent/minsh-test-program\necho after\nexit\n")
        .stdout()
        .contains("after")
        .stderr()
        .contains("minsh: /nonexistent/minsh-test-program: failed to execute")
        .succeeds()
        .unwrap();
}

#[test]
fn test_empty_line_is_reported() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("\necho still running\nexit\n")
        .stdout()
        .contains("still running")
        .stderr()
        .contains("minsh: empty command")
        .succeeds()
        .unwrap();
}

#[test]
fn test_syntax_error_is_reported() {
    let temp_dir = scratch();
    minsh(&temp_dir, &[])
        .stdin("echo >\nexit\n")
        .stderr()
        .contains("syntax error near: echo >")
        .succeeds()
        .unwrap();
}

#[test]
fn test_max_args() {
    let temp_dir = scratch();
    minsh(&temp_dir, &["--max-args=1", "-c", "echo a b"])
        .stderr()
        .contains("too many arguments")
        .fails_with(2)
        .unwrap();
}

#[test]
fn test_version() {
    let temp_dir = scratch();
    minsh(&temp_dir, &["--version"])
        .stdout()
        .contains("minsh version")
        .unwrap();
}

fn get_path_to_test_scripts() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scripts")
}

/// Does filename start with 'simple' and end with '.minsh'?
fn is_simple_minsh_script(entry: &DirEntry) -> bool {
    let filename = entry.file_name();
    let unicode_filename = filename.to_str().expect("filename should be valid Unicode");
    unicode_filename.starts_with("simple") && unicode_filename.ends_with(".minsh")
}
