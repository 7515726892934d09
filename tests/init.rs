mod common;

use common::command::{repository_dir, run_twig_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn init_creates_the_repository_layout(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty twig repository"));

    let twig_dir = repository_dir.path().join(".twig");
    assert!(twig_dir.join("objects").is_dir());
    assert!(twig_dir.join("refs").join("heads").is_dir());

    let head = std::fs::read_to_string(twig_dir.join("HEAD")).unwrap();
    assert_eq!(head, "ref: refs/heads/master\n");
}

#[rstest]
fn init_at_an_explicit_path(repository_dir: TempDir) {
    let target = repository_dir.path().join("nested").join("project");

    run_twig_command(repository_dir.path(), &["init", target.to_str().unwrap()])
        .assert()
        .success();

    assert!(target.join(".twig").is_dir());
}

#[rstest]
fn reinitializing_is_a_friendly_no_op(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Twig repository already exists"));
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a twig repository"));
}
