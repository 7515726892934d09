use crate::areas::repository::Repository;
use crate::artifacts::diff::{self, Edit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::TwigError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Compare two revisions (branch names or commit hashes) file by file,
    /// rendering a line diff for every changed file.
    pub fn diff(&self, left: &str, right: &str) -> anyhow::Result<()> {
        let left_oid = self.resolve_revision(left)?;
        let right_oid = self.resolve_revision(right)?;

        let left_commit = self.database().load_commit(&left_oid)?;
        let right_commit = self.database().load_commit(&right_oid)?;
        let left_contents = self.database().tree_contents(left_commit.tree_oid())?;
        let right_contents = self.database().tree_contents(right_commit.tree_oid())?;

        writeln!(self.writer(), "Diff between {left} and {right}:")?;

        for (path, left_content) in &left_contents {
            match right_contents.get(path) {
                None => {
                    writeln!(self.writer(), "\n{}", format!("File deleted: {path}").red())?;
                }
                Some(right_content) if right_content != left_content => {
                    writeln!(self.writer(), "\n{}", format!("File changed: {path}").yellow())?;
                    self.render_line_diff(left_content, right_content)?;
                }
                Some(_) => {}
            }
        }

        for path in right_contents.keys() {
            if !left_contents.contains_key(path) {
                writeln!(self.writer(), "\n{}", format!("File added: {path}").green())?;
            }
        }

        Ok(())
    }

    fn render_line_diff(&self, left: &str, right: &str) -> anyhow::Result<()> {
        let left_lines = left.lines().collect::<Vec<_>>();
        let right_lines = right.lines().collect::<Vec<_>>();

        for edit in diff::compute(&left_lines, &right_lines) {
            match edit {
                Edit::Equal(line) => writeln!(self.writer(), "  {line}")?,
                Edit::Insert(line) => writeln!(self.writer(), "{}", format!("+ {line}").green())?,
                Edit::Delete(line) => writeln!(self.writer(), "{}", format!("- {line}").red())?,
            }
        }

        Ok(())
    }

    /// Resolve a branch name or full commit hash to a commit id.
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        if self.refs().branch_exists(revision) {
            return self.refs().branch_commit(revision);
        }

        if let Ok(oid) = ObjectId::try_parse(revision)
            && self.database().contains(&oid)
        {
            return Ok(oid);
        }

        Err(TwigError::NotFound(format!("revision {revision}")).into())
    }
}
