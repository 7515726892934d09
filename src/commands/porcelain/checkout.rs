use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::TwigError;
use std::io::Write;

impl Repository {
    /// Switch to a branch, or detach HEAD onto a raw commit hash.
    pub fn checkout(&self, target: &str) -> anyhow::Result<()> {
        if self.refs().branch_exists(target) {
            let oid = self.refs().branch_commit(target)?;
            self.reset_worktree_to(&oid)?;
            self.refs().set_head_branch(target)?;

            writeln!(self.writer(), "Switched to branch '{target}'")?;
            return Ok(());
        }

        if let Ok(oid) = ObjectId::try_parse(target)
            && self.database().contains(&oid)
        {
            self.reset_worktree_to(&oid)?;
            self.refs().set_head_detached(&oid)?;

            writeln!(self.writer(), "Checked out commit {oid} (detached HEAD)")?;
            return Ok(());
        }

        Err(TwigError::NotFound(format!("branch or commit {target}")).into())
    }

    /// Overwrite the working snapshot and the index with a commit's tree.
    pub(crate) fn reset_worktree_to(&self, commit_oid: &ObjectId) -> anyhow::Result<()> {
        let flattened = self.database().flatten_commit_tree(commit_oid)?;

        let contents = flattened
            .iter()
            .map(|(path, oid)| {
                Ok((path.clone(), self.database().load_blob(oid)?.content().to_string()))
            })
            .collect::<anyhow::Result<_>>()?;
        self.workspace().replace_with(&contents, self.ignore())?;

        let mut index = self.index();
        index.replace_with(flattened);
        index.write_updates()
    }
}
