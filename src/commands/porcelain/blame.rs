use crate::areas::repository::Repository;
use crate::artifacts::blame;
use crate::error::TwigError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn blame(&self, path: &str) -> anyhow::Result<()> {
        let head = self
            .refs()
            .read_head()?
            .ok_or_else(|| TwigError::NotFound("HEAD commit (no commits yet)".to_string()))?;

        let lines = blame::blame(self.database(), &head, path)?;

        for (index, blamed) in lines.iter().enumerate() {
            writeln!(
                self.writer(),
                "{} {} {}: {}",
                blamed.oid.to_short_oid().yellow(),
                format!("({})", blamed.author).blue(),
                index + 1,
                blamed.line
            )?;
        }

        Ok(())
    }
}
