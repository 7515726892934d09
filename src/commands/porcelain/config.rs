use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn config_set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = self.config();

        match key {
            "user.name" => {
                config.set_user_name(value);
                config.save()?;
                writeln!(self.writer(), "User name set to: {value}")?;
            }
            "user.email" => {
                config.set_user_email(value);
                config.save()?;
                writeln!(self.writer(), "User email set to: {value}")?;
            }
            other => anyhow::bail!("unknown config key {other:?} (expected user.name or user.email)"),
        }

        Ok(())
    }

    pub fn whoami(&self) -> anyhow::Result<()> {
        match self.config().identity() {
            Some(identity) => {
                writeln!(self.writer(), "Name: {}", identity.name)?;
                writeln!(self.writer(), "Email: {}", identity.email)?;
            }
            None => {
                writeln!(
                    self.writer(),
                    "User information not set. Use 'twig config' to set your name and email."
                )?;
            }
        }

        Ok(())
    }
}
