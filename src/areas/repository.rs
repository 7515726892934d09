//! Repository facade.
//!
//! One `Repository` is one command invocation's view of the on-disk state:
//! it wires the object database, staging index, refs, working tree, ignore
//! rules and identity config together. Execution is single-threaded and
//! synchronous; the interior mutability below exists only so commands can
//! borrow several areas at once, not for any concurrency.

use crate::areas::config::{Config, Identity};
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnoreRules;
use crate::error::TwigError;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

pub const METADATA_DIR: &str = ".twig";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: RefCell<Config>,
    ignore: IgnoreRules,
}

impl Repository {
    /// Bind to a directory without requiring an initialized repository
    /// (used by `init`).
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let twig_dir = path.join(METADATA_DIR);

        let mut index = Index::new(twig_dir.join("index").into_boxed_path());
        index.rehydrate()?;

        Ok(Repository {
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database: Database::new(twig_dir.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(twig_dir.clone().into_boxed_path()),
            config: RefCell::new(Config::load(twig_dir.join("config").into_boxed_path())?),
            ignore: IgnoreRules::load(&path),
            path: path.into_boxed_path(),
        })
    }

    /// Bind to an existing repository; errors with `InvalidRepository` when
    /// the metadata directory is missing.
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.join(METADATA_DIR).is_dir() {
            return Err(TwigError::InvalidRepository.into());
        }

        Self::new(path, writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn twig_dir(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    pub fn ignore(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// The author identity for commit-creating operations.
    pub fn identity(&self) -> anyhow::Result<Identity> {
        self.config
            .borrow()
            .identity()
            .ok_or_else(|| TwigError::MissingIdentity.into())
    }
}
