//! User identity configuration.
//!
//! Stored as JSON under `.twig/config`. The identity is handed to
//! commit-creating operations as an explicit value; nothing reads it from
//! global state. `TWIG_AUTHOR_NAME`/`TWIG_AUTHOR_EMAIL` act as a fallback
//! when the config file has no identity.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A configured author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    path: Option<Box<Path>>,
    user: UserSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Config {
    /// Load `.twig/config`; a missing file yields an empty config.
    pub fn load(path: Box<Path>) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("unable to read config file {}", path.display()))?;
            serde_json::from_str::<Config>(&raw).context("config file is not valid JSON")?
        } else {
            Config::default()
        };

        config.path = Some(path);
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = self.path.as_ref().context("config has no backing file")?;
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("unable to write config file {}", path.display()))
    }

    /// The configured identity, falling back to the environment; None when
    /// neither source is complete.
    pub fn identity(&self) -> Option<Identity> {
        let name = self
            .user
            .name
            .clone()
            .or_else(|| std::env::var("TWIG_AUTHOR_NAME").ok())?;
        let email = self
            .user
            .email
            .clone()
            .or_else(|| std::env::var("TWIG_AUTHOR_EMAIL").ok())?;

        Some(Identity { name, email })
    }

    pub fn set_user_name(&mut self, name: &str) {
        self.user.name = Some(name.to_string());
    }

    pub fn set_user_email(&mut self, email: &str) {
        self.user.email = Some(email.to_string());
    }
}
