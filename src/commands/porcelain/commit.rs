use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::error::TwigError;
use std::io::Write;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        if self.index().is_empty() {
            return Err(TwigError::NothingStaged.into());
        }

        let identity = self.identity()?;
        let tree_oid = self.index().write_tree(self.database())?;

        let parent = self.refs().read_head()?;
        let is_root = parent.is_none();

        let commit = Commit::new(
            parent.into_iter().collect(),
            tree_oid,
            Author::new(identity.name, identity.email),
            message.trim().to_string(),
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_head(&commit_oid)?;
        self.index().write_updates()?;

        let branch = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        writeln!(
            self.writer(),
            "[{branch}{} {}] {}",
            if is_root { " (root-commit)" } else { "" },
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
