mod common;

use common::command::{init_repository_dir, run_twig_command, twig_commit, twig_stdout};
use common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

/// Diverge the fixture repository: `other` adds fresh.txt, `master` extends
/// base.txt with a second line.
fn diverge(dir: &std::path::Path) {
    run_twig_command(dir, &["branch", "other"]).assert().success();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    write_file(FileSpec::new(dir.join("fresh.txt"), "fresh\n".to_string()));
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "add fresh.txt").assert().success();

    run_twig_command(dir, &["checkout", "master"]).assert().success();
    write_file(FileSpec::new(
        dir.join("base.txt"),
        "base\nsecond line\n".to_string(),
    ));
    run_twig_command(dir, &["add", "base.txt"]).assert().success();
    twig_commit(dir, "extend base.txt").assert().success();
}

#[rstest]
fn diff_reports_changed_and_added_files(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    diverge(dir.path());

    let output = twig_stdout(dir.path(), &["diff", "master", "other"]);

    assert!(output.contains("Diff between master and other:"));
    assert!(output.contains("File changed: base.txt"));
    assert!(output.contains("File added: fresh.txt"));
}

#[rstest]
fn diff_reports_files_missing_on_the_right_as_deleted(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    diverge(dir.path());

    // relative to other, master has no fresh.txt
    let output = twig_stdout(dir.path(), &["diff", "other", "master"]);
    assert!(output.contains("File deleted: fresh.txt"));
}

#[rstest]
fn diff_renders_line_level_edits(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    diverge(dir.path());

    let output = twig_stdout(dir.path(), &["diff", "other", "master"]);

    assert!(output.contains("  base"));
    assert!(output.contains("+ second line"));

    let reverse = twig_stdout(dir.path(), &["diff", "master", "other"]);
    assert!(reverse.contains("- second line"));
}

#[rstest]
fn diff_accepts_raw_commit_hashes(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    diverge(dir.path());

    let log = twig_stdout(dir.path(), &["log"]);
    let oids = log
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(str::trim)
        .collect::<Vec<_>>();
    assert!(oids.len() >= 2);

    let output = twig_stdout(dir.path(), &["diff", oids[1], oids[0]]);
    assert!(output.contains(&format!("Diff between {} and {}:", oids[1], oids[0])));
}

#[rstest]
fn diff_of_unknown_revisions_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_twig_command(dir.path(), &["diff", "master", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("revision ghost not found"));
}
