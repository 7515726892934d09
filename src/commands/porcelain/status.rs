use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

impl Repository {
    pub fn status(&self) -> anyhow::Result<()> {
        let branch = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "HEAD (detached)".to_string());
        writeln!(self.writer(), "On branch {branch}")?;

        let head_snapshot = match self.refs().read_head()? {
            Some(head) => self.database().flatten_commit_tree(&head)?,
            None => BTreeMap::new(),
        };

        let staged = self.staged_changes(&head_snapshot);
        let (modified, deleted) = self.worktree_changes()?;
        let untracked = self.untracked_files()?;

        if !staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for (path, change) in &staged {
                writeln!(self.writer(), "{}", format!("\t{change}:   {path}").green())?;
            }
        }

        if !modified.is_empty() || !deleted.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            for path in &modified {
                writeln!(self.writer(), "{}", format!("\tmodified:   {path}").red())?;
            }
            for path in &deleted {
                writeln!(self.writer(), "{}", format!("\tdeleted:    {path}").red())?;
            }
        }

        if !untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &untracked {
                writeln!(self.writer(), "{}", format!("\t{path}").red())?;
            }
        }

        if staged.is_empty() && modified.is_empty() && deleted.is_empty() && untracked.is_empty() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
        }

        Ok(())
    }

    /// Index entries that differ from the HEAD snapshot, plus HEAD entries
    /// that were unstaged.
    fn staged_changes(&self, head_snapshot: &BTreeMap<String, ObjectId>) -> Vec<(String, &'static str)> {
        let index = self.index();
        let mut changes = Vec::new();

        for (path, oid) in index.entries() {
            match head_snapshot.get(path) {
                None => changes.push((path.clone(), "new file")),
                Some(head_oid) if head_oid != oid => changes.push((path.clone(), "modified")),
                Some(_) => {}
            }
        }
        for path in head_snapshot.keys() {
            if index.get(path).is_none() {
                changes.push((path.clone(), "deleted"));
            }
        }

        changes.sort();
        changes
    }

    /// Tracked files whose workspace content no longer matches the staged
    /// hash, and tracked files missing from the workspace.
    fn worktree_changes(&self) -> anyhow::Result<(Vec<String>, Vec<String>)> {
        let index = self.index();
        let mut modified = Vec::new();
        let mut deleted = Vec::new();

        for (path, staged_oid) in index.entries() {
            if !self.workspace().file_exists(path) {
                deleted.push(path.clone());
                continue;
            }

            let content = self.workspace().read_file(path)?;
            if &Blob::new(content).object_id()? != staged_oid {
                modified.push(path.clone());
            }
        }

        Ok((modified, deleted))
    }

    fn untracked_files(&self) -> anyhow::Result<Vec<String>> {
        let index = self.index();

        Ok(self
            .workspace()
            .list_files(self.ignore())?
            .into_iter()
            .map(|path| path.to_string_lossy().to_string())
            .filter(|path| index.get(path).is_none())
            .collect())
    }
}
