//! Tree object: one directory level of a snapshot.
//!
//! On disk: `tree <size>\0` followed by newline-delimited records of the
//! form `<mode> <type> <hash>\t<name>` (tab before the name, so names may
//! contain spaces).
//!
//! Nested directories become nested tree objects: `Tree::build` assembles
//! the hierarchy bottom-up from staged paths, and each subtree is
//! independently content-addressed, so unchanged subtrees share storage
//! across commits.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Regular,
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Directory => "40000",
        }
    }
}

impl TryFrom<&str> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(EntryMode::Regular),
            "40000" => Ok(EntryMode::Directory),
            other => Err(anyhow::anyhow!("unsupported entry mode {other:?}")),
        }
    }
}

/// One parsed record of a stored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRecord {
    pub mode: EntryMode,
    pub object_type: ObjectType,
    pub oid: ObjectId,
}

/// An entry still being assembled from staged paths.
#[derive(Debug, Clone)]
enum PendingEntry {
    File(ObjectId),
    Directory(Tree),
}

/// A directory snapshot.
///
/// Trees loaded from the database populate `stored_entries`; trees being
/// built from the index populate `pending_entries`. Entry order is the
/// lexicographic map order, which makes serialization canonical.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    stored_entries: BTreeMap<String, TreeRecord>,
    pending_entries: BTreeMap<String, PendingEntry>,
}

impl Tree {
    /// Assemble the tree hierarchy from flat `path -> blob id` pairs.
    ///
    /// Paths use `/` separators; intermediate directories are created as
    /// nested trees.
    pub fn build<'e>(
        entries: impl Iterator<Item = (&'e String, &'e ObjectId)>,
    ) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for (path, oid) in entries {
            let components = path.split('/').filter(|c| !c.is_empty()).collect::<Vec<_>>();
            root.add_entry(&components, oid)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, components: &[&str], oid: &ObjectId) -> anyhow::Result<()> {
        match components {
            [] => anyhow::bail!("cannot stage an empty path"),
            [name] => {
                self.pending_entries
                    .insert((*name).to_string(), PendingEntry::File(oid.clone()));
            }
            [dir, rest @ ..] => {
                let entry = self
                    .pending_entries
                    .entry((*dir).to_string())
                    .or_insert_with(|| PendingEntry::Directory(Tree::default()));

                match entry {
                    PendingEntry::Directory(tree) => tree.add_entry(rest, oid)?,
                    PendingEntry::File(_) => {
                        anyhow::bail!("path component {dir:?} is staged as both file and directory")
                    }
                }
            }
        }

        Ok(())
    }

    /// Visit subtrees before their parent (post-order), so child object ids
    /// are storable before the parent record that references them.
    pub fn traverse<F>(&self, func: &F) -> anyhow::Result<()>
    where
        F: Fn(&Tree) -> anyhow::Result<()>,
    {
        for entry in self.pending_entries.values() {
            if let PendingEntry::Directory(tree) = entry {
                tree.traverse(func)?;
            }
        }
        func(self)
    }

    /// Records of a tree loaded from the database.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeRecord)> {
        self.stored_entries.iter()
    }

    pub fn record(&self, name: &str) -> Option<&TreeRecord> {
        self.stored_entries.get(name)
    }

    fn render_records(&self) -> anyhow::Result<String> {
        if self.pending_entries.is_empty() {
            return Ok(self
                .stored_entries
                .iter()
                .map(|(name, record)| {
                    format!(
                        "{} {} {}\t{}\n",
                        record.mode.as_str(),
                        record.object_type.as_str(),
                        record.oid,
                        name
                    )
                })
                .collect());
        }

        self.pending_entries
            .iter()
            .map(|(name, entry)| match entry {
                PendingEntry::File(oid) => Ok(format!(
                    "{} blob {}\t{}\n",
                    EntryMode::Regular.as_str(),
                    oid,
                    name
                )),
                PendingEntry::Directory(tree) => Ok(format!(
                    "{} tree {}\t{}\n",
                    EntryMode::Directory.as_str(),
                    tree.object_id()?,
                    name
                )),
            })
            .collect()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let body = self.render_records()?;

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), body.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(body.as_bytes())?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let mut entries = BTreeMap::new();
        for line in content.lines() {
            let mut parts = line.splitn(3, ' ');
            let mode = parts.next().context("missing mode in tree record")?;
            let object_type = parts.next().context("missing type in tree record")?;
            let rest = parts.next().context("missing hash in tree record")?;
            let (oid, name) = rest
                .split_once('\t')
                .with_context(|| format!("malformed tree record {line:?}"))?;

            entries.insert(
                name.to_string(),
                TreeRecord {
                    mode: EntryMode::try_from(mode)?,
                    object_type: ObjectType::try_from(object_type)?,
                    oid: ObjectId::try_parse(oid)?,
                },
            );
        }

        Ok(Tree {
            stored_entries: entries,
            pending_entries: BTreeMap::new(),
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    fn staged(pairs: &[(&str, char)]) -> BTreeMap<String, ObjectId> {
        pairs
            .iter()
            .map(|(path, fill)| (path.to_string(), oid(*fill)))
            .collect()
    }

    #[test]
    fn flat_tree_serializes_in_record_format() {
        let entries = staged(&[("b.txt", 'b'), ("a.txt", 'a')]);
        let tree = Tree::build(entries.iter()).unwrap();

        let body = format!(
            "100644 blob {}\ta.txt\n100644 blob {}\tb.txt\n",
            oid('a'),
            oid('b')
        );
        let expected = format!("tree {}\0{}", body.len(), body);
        assert_eq!(tree.serialize().unwrap().as_ref(), expected.as_bytes());
    }

    #[test]
    fn nested_paths_become_nested_trees() {
        let entries = staged(&[("src/lib.rs", 'a'), ("src/deep/util.rs", 'b'), ("README", 'c')]);
        let tree = Tree::build(entries.iter()).unwrap();

        let bytes = tree.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();
        let parsed = Tree::deserialize(reader).unwrap();

        let names = parsed.entries().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["README", "src"]);
        assert_eq!(
            parsed.record("src").unwrap().object_type,
            ObjectType::Tree
        );
        assert_eq!(parsed.record("README").unwrap().oid, oid('c'));
    }

    #[test]
    fn identical_subtrees_are_content_addressed_identically() {
        let left = Tree::build(staged(&[("dir/f.txt", 'a')]).iter()).unwrap();
        let right = Tree::build(staged(&[("dir/f.txt", 'a'), ("other.txt", 'b')]).iter()).unwrap();

        let subtree_id_of = |tree: &Tree| {
            let bytes = tree.serialize().unwrap();
            let mut reader = Cursor::new(bytes);
            ObjectType::parse_header(&mut reader).unwrap();
            Tree::deserialize(reader).unwrap().record("dir").unwrap().oid.clone()
        };

        assert_eq!(subtree_id_of(&left), subtree_id_of(&right));
    }

    #[test]
    fn stored_trees_round_trip_byte_identically() {
        let entries = staged(&[("x.txt", 'd'), ("notes/a b.txt", 'e')]);
        let tree = Tree::build(entries.iter()).unwrap();
        let first = tree.serialize().unwrap();

        let mut reader = Cursor::new(first.clone());
        ObjectType::parse_header(&mut reader).unwrap();
        let parsed = Tree::deserialize(reader).unwrap();

        assert_eq!(parsed.serialize().unwrap(), first);
    }

    #[test]
    fn file_and_directory_collision_is_rejected() {
        let entries = staged(&[("src", 'a'), ("src/lib.rs", 'b')]);
        assert!(Tree::build(entries.iter()).is_err());
    }
}
