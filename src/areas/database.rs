//! Content-addressable object database.
//!
//! Objects live under `objects/<2-hex>/<38-hex>` as zlib-compressed
//! `header || body` files. Writes are idempotent (an existing address is
//! never rewritten) and atomic: content goes to a temp file which is then
//! renamed into place, so a crash never leaves a partially written object.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::error::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

// TODO: cache parsed commits and flattened trees; blame and the merge base
// search currently re-read the same objects on every step
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object and return its address.
    ///
    /// Re-storing identical content is a no-op beyond the existence check.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("invalid object path {}", object_path.display()))?,
            )?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, reader) = self.open_object(object_id)?;
        match object_type {
            ObjectType::Blob => Blob::deserialize(reader),
            other => anyhow::bail!("object {object_id} is a {other}, expected a blob"),
        }
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let (object_type, reader) = self.open_object(object_id)?;
        match object_type {
            ObjectType::Tree => Tree::deserialize(reader),
            other => anyhow::bail!("object {object_id} is a {other}, expected a tree"),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, reader) = self.open_object(object_id)?;
        match object_type {
            ObjectType::Commit => Commit::deserialize(reader),
            other => anyhow::bail!("object {object_id} is a {other}, expected a commit"),
        }
    }

    /// Flatten a tree (and its nested subtrees) into repo-relative
    /// `path -> blob id` pairs.
    pub fn flatten_tree(&self, tree_oid: &ObjectId) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let mut flattened = BTreeMap::new();
        self.flatten_into(tree_oid, "", &mut flattened)?;
        Ok(flattened)
    }

    /// Flatten the tree of a commit; see [`Self::flatten_tree`].
    pub fn flatten_commit_tree(
        &self,
        commit_oid: &ObjectId,
    ) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let commit = self.load_commit(commit_oid)?;
        self.flatten_tree(commit.tree_oid())
    }

    /// Load every blob of a flattened tree as text, keyed by path.
    pub fn tree_contents(&self, tree_oid: &ObjectId) -> anyhow::Result<BTreeMap<String, String>> {
        self.flatten_tree(tree_oid)?
            .into_iter()
            .map(|(path, oid)| Ok((path, self.load_blob(&oid)?.content().to_string())))
            .collect()
    }

    fn flatten_into(
        &self,
        tree_oid: &ObjectId,
        prefix: &str,
        flattened: &mut BTreeMap<String, ObjectId>,
    ) -> anyhow::Result<()> {
        let tree = self.load_tree(tree_oid)?;

        for (name, record) in tree.entries() {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            match record.object_type {
                ObjectType::Blob => {
                    flattened.insert(path, record.oid.clone());
                }
                ObjectType::Tree => self.flatten_into(&record.oid, &path, flattened)?,
                ObjectType::Commit => {
                    anyhow::bail!("tree {tree_oid} references a commit entry {name:?}")
                }
            }
        }

        Ok(())
    }

    fn open_object(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let content = self.read_object(object_id)?;
        let mut reader = Cursor::new(content);

        let (object_type, _declared_len) = ObjectType::parse_header(&mut reader)?;

        Ok((object_type, reader))
    }

    fn read_object(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let compressed = match std::fs::read(&object_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TwigError::NotFound(format!("object {object_id}")).into());
            }
            Err(err) => {
                return Err(err)
                    .context(format!("unable to read object file {}", object_path.display()));
            }
        };

        Self::decompress(compressed.into())
    }

    fn write_object(&self, object_path: PathBuf, content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "unable to open object file {}",
                temp_object_path.display()
            ))?;
        file.write_all(&compressed)?;
        file.flush()?;

        // rename the temp file into place to make the write atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(Into::into)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Author;
    use walkdir::WalkDir;

    fn temp_database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().expect("failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    fn object_file_count(database: &Database) -> usize {
        WalkDir::new(database.objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .count()
    }

    #[test]
    fn storing_identical_content_twice_keeps_one_physical_object() {
        let (_dir, database) = temp_database();
        let blob = Blob::new("duplicated bytes".to_string());

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(object_file_count(&database), 1);
    }

    #[test]
    fn stored_blobs_round_trip() {
        let (_dir, database) = temp_database();
        let blob = Blob::new("alpha\nbeta\n".to_string());

        let oid = database.store(&blob).unwrap();
        let loaded = database.load_blob(&oid).unwrap();

        assert_eq!(loaded, blob);
    }

    #[test]
    fn stored_commits_round_trip() {
        let (_dir, database) = temp_database();
        let tree = Tree::build(std::iter::empty()).unwrap();
        let tree_oid = database.store(&tree).unwrap();

        let author = Author::new_with_timestamp(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            chrono::DateTime::parse_from_rfc3339("2024-03-01T10:30:00+00:00").unwrap(),
        );
        let commit = Commit::new(vec![], tree_oid, author, "initial".to_string());

        let oid = database.store(&commit).unwrap();
        assert_eq!(database.load_commit(&oid).unwrap(), commit);
    }

    #[test]
    fn loading_a_missing_object_reports_not_found() {
        let (_dir, database) = temp_database();
        let absent = ObjectId::try_parse("0".repeat(40)).unwrap();

        let err = database.load_blob(&absent).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::NotFound(_))
        ));
    }

    #[test]
    fn garbage_object_file_reports_corruption() {
        let (_dir, database) = temp_database();
        let blob = Blob::new("payload".to_string());
        let oid = database.store(&blob).unwrap();

        // overwrite the object with compressed bytes lacking a header separator
        let object_path = database.objects_path().join(oid.to_path());
        let garbage = Database::compress(Bytes::from_static(b"no separator here")).unwrap();
        std::fs::write(&object_path, garbage).unwrap();

        let err = database.load_blob(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::CorruptObject(_))
        ));
    }

    #[test]
    fn flattening_recovers_nested_paths() {
        let (_dir, database) = temp_database();

        let file_a = database.store(&Blob::new("a".to_string())).unwrap();
        let file_b = database.store(&Blob::new("b".to_string())).unwrap();

        let staged: BTreeMap<String, ObjectId> = [
            ("src/lib.rs".to_string(), file_a.clone()),
            ("src/nested/mod.rs".to_string(), file_b.clone()),
        ]
        .into_iter()
        .collect();

        let tree = Tree::build(staged.iter()).unwrap();
        tree.traverse(&|subtree| database.store(subtree).map(|_| ()))
            .unwrap();
        let root_oid = tree.object_id().unwrap();

        let flattened = database.flatten_tree(&root_oid).unwrap();
        assert_eq!(flattened, staged);
    }
}
