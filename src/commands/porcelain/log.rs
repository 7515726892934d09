use crate::areas::repository::Repository;
use crate::artifacts::log;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the first-parent history of HEAD, newest first.
    pub fn log(&self) -> anyhow::Result<()> {
        let Some(head) = self.refs().read_head()? else {
            writeln!(self.writer(), "No commits yet")?;
            return Ok(());
        };

        for oid in log::history(self.database(), &head)? {
            let commit = self.database().load_commit(&oid)?;

            writeln!(self.writer(), "commit {}", oid.to_string().yellow())?;

            let branches = self.refs().branches_at(&oid)?;
            if !branches.is_empty() {
                writeln!(self.writer(), "Branches: {}", branches.join(", "))?;
            }

            writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
            writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;

            writeln!(self.writer())?;
            for line in commit.message().lines() {
                writeln!(self.writer(), "\t{line}")?;
            }
            writeln!(self.writer())?;
        }

        Ok(())
    }
}
