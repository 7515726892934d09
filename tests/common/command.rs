use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const TEST_AUTHOR_NAME: &str = "Test Author";
pub const TEST_AUTHOR_EMAIL: &str = "test@example.com";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// A fresh repository with one committed file.
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("base.txt"),
        "base\n".to_string(),
    ));

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("failed to find twig binary");
    cmd.current_dir(dir);
    cmd.env("TWIG_AUTHOR_NAME", TEST_AUTHOR_NAME);
    cmd.env("TWIG_AUTHOR_EMAIL", TEST_AUTHOR_EMAIL);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Like [`run_twig_command`] but with no identity in the environment.
pub fn run_twig_command_anonymous(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("failed to find twig binary");
    cmd.current_dir(dir);
    cmd.env_remove("TWIG_AUTHOR_NAME");
    cmd.env_remove("TWIG_AUTHOR_EMAIL");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", "-m", message])
}

/// Stdout of a successful twig invocation.
pub fn twig_stdout(dir: &Path, args: &[&str]) -> String {
    let output = run_twig_command(dir, args)
        .output()
        .expect("failed to run twig");
    assert!(
        output.status.success(),
        "twig {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is not utf-8")
}

/// Number of commits reachable from HEAD along first parents.
pub fn commit_count(dir: &Path) -> usize {
    twig_stdout(dir, &["log"])
        .lines()
        .filter(|line| line.starts_with("commit "))
        .count()
}
