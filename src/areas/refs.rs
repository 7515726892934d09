//! References: branches and HEAD.
//!
//! A branch is a file under `refs/heads/<name>` holding a 40-character
//! commit hash. HEAD is either symbolic (`ref: refs/heads/<branch>\n`) or a
//! raw hash (detached). A symbolic HEAD pointing at a branch whose ref file
//! does not exist yet denotes an unborn repository (fresh `init`).
//!
//! Ref files are plain writes; simultaneous invocations may race. That is a
//! documented limitation, not coordinated here.

use crate::artifacts::objects::object_id::ObjectId;
use crate::error::TwigError;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Pattern for symbolic HEAD contents.
const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

/// Name of the default branch created by `init`.
pub const DEFAULT_BRANCH: &str = "master";

/// Where HEAD points right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Symbolic HEAD on a branch (the branch may be unborn).
    Branch(String),
    /// Detached HEAD on a raw commit.
    Detached(ObjectId),
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.twig`).
    path: Box<Path>,
}

impl Refs {
    /// Point HEAD at the default branch. Used by `init`.
    pub fn init_head(&self) -> anyhow::Result<()> {
        self.set_head_branch(DEFAULT_BRANCH)
    }

    /// Parse HEAD into its symbolic or detached form.
    pub fn head(&self) -> anyhow::Result<Head> {
        let content = std::fs::read_to_string(self.head_path())
            .map_err(|_| TwigError::InvalidRepository)?;
        let content = content.trim();

        let symref = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref {
            Some(captures) => Ok(Head::Branch(captures[1].to_string())),
            None => Ok(Head::Detached(ObjectId::try_parse(content).map_err(
                |_| TwigError::CorruptObject(format!("malformed HEAD contents {content:?}")),
            )?)),
        }
    }

    /// Name of the current branch, or None when HEAD is detached.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        match self.head()? {
            Head::Branch(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    /// Commit HEAD resolves to; None for an unborn repository.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.head()? {
            Head::Branch(name) => self.read_branch(&name),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Advance HEAD to a new commit: through the current branch when
    /// symbolic, in place when detached.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.head()? {
            Head::Branch(name) => self.update_branch(&name, oid),
            Head::Detached(_) => self.write_ref_file(&self.head_path(), oid.as_ref()),
        }
    }

    pub fn set_head_branch(&self, name: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("ref: refs/heads/{name}\n"))
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), oid.as_ref())
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).exists()
    }

    /// Commit a branch points to; errors with `NotFound` for an unknown
    /// branch name.
    pub fn branch_commit(&self, name: &str) -> anyhow::Result<ObjectId> {
        self.read_branch(name)?
            .ok_or_else(|| TwigError::NotFound(format!("branch {name}")).into())
    }

    fn read_branch(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let path = self.branch_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("unable to read ref file {}", path.display()))?;
        Ok(Some(ObjectId::try_parse(content.trim()).map_err(|_| {
            TwigError::CorruptObject(format!("malformed ref file for branch {name}"))
        })?))
    }

    /// Create a branch at the current HEAD commit.
    pub fn create_branch(&self, name: &str) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(TwigError::AlreadyExists(name.to_string()).into());
        }

        let head_oid = self
            .read_head()?
            .ok_or_else(|| TwigError::NotFound("HEAD commit (no commits yet)".to_string()))?;

        self.update_branch(name, &head_oid)
    }

    pub fn update_branch(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.branch_path(name), oid.as_ref())
    }

    /// Branch names, sorted.
    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let heads = self.heads_path();
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut branches = std::fs::read_dir(&heads)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    /// Branches pointing at a commit, for log decoration.
    pub fn branches_at(&self, oid: &ObjectId) -> anyhow::Result<Vec<String>> {
        Ok(self
            .list_branches()?
            .into_iter()
            .filter(|name| {
                matches!(self.read_branch(name), Ok(Some(branch_oid)) if &branch_oid == oid)
            })
            .collect())
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(
            path.parent()
                .with_context(|| format!("invalid ref path {}", path.display()))?,
        )?;
        std::fs::write(path, content)
            .with_context(|| format!("unable to write ref file {}", path.display()))
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs").join("heads")
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_path().join(name)
    }
}
