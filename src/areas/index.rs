//! Staging index.
//!
//! The index maps repo-relative paths to blob ids and represents what the
//! next commit's tree will contain. It is persisted as a JSON list of
//! `(path, hash)` pairs so it round-trips stably across invocations:
//! loaded at session start, mutated by add/checkout/merge operations, and
//! flushed after every mutating command.
//!
//! Two simultaneous invocations may race on the index file; cross-process
//! coordination is out of scope.

use crate::areas::database::Database;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.twig/index`).
    path: Box<Path>,
    /// Staged `path -> blob id` pairs.
    entries: BTreeMap<String, ObjectId>,
    /// Set when the in-memory state diverges from the persisted file.
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    /// Load the persisted entries, replacing the in-memory state.
    /// A missing index file means an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("unable to read index file {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(());
        }

        let pairs: Vec<(String, ObjectId)> =
            serde_json::from_str(&raw).context("index file is not a valid pair list")?;
        self.entries = pairs.into_iter().collect();

        Ok(())
    }

    /// Persist the entries as an ordered pair list.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let pairs = self.entries.iter().collect::<Vec<_>>();
        let raw = serde_json::to_string(&pairs)?;

        std::fs::write(&self.path, raw)
            .with_context(|| format!("unable to write index file {}", self.path.display()))?;
        self.changed = false;

        Ok(())
    }

    /// Record a staged blob for `path`. Returns false when the recorded
    /// hash is already identical, so unchanged files produce no mutation.
    pub fn add(&mut self, path: &str, oid: ObjectId) -> bool {
        if self.entries.get(path) == Some(&oid) {
            return false;
        }

        self.entries.insert(path.to_string(), oid);
        self.changed = true;
        true
    }

    pub fn remove(&mut self, path: &str) {
        if self.entries.remove(path).is_some() {
            self.changed = true;
        }
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
    }

    /// Replace the whole mapping with a flattened tree snapshot
    /// (checkout, merge).
    pub fn replace_with(&mut self, entries: BTreeMap<String, ObjectId>) {
        self.entries = entries;
        self.changed = true;
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &ObjectId)> {
        self.entries.iter()
    }

    /// Serialize the staged mapping into a tree-of-trees and store every
    /// subtree; returns the root tree id.
    pub fn write_tree(&self, database: &Database) -> anyhow::Result<ObjectId> {
        let tree = Tree::build(self.entries.iter())?;
        tree.traverse(&|subtree| database.store(subtree).map(|_| ()))?;
        tree.object_id()
    }
}
