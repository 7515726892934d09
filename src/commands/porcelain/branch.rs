use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List branches, or create one at the current HEAD commit.
    pub fn branch(&self, name: Option<&str>) -> anyhow::Result<()> {
        match name {
            None => self.list_branches(),
            Some(name) => {
                self.refs().create_branch(name)?;
                writeln!(self.writer(), "Created branch {name}")?;
                Ok(())
            }
        }
    }

    fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            if Some(&branch) == current.as_ref() {
                writeln!(self.writer(), "* {branch}")?;
            } else {
                writeln!(self.writer(), "  {branch}")?;
            }
        }

        Ok(())
    }
}
