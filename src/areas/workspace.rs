//! Working tree access.
//!
//! All paths handed in and out are repo-relative. Listing skips the `.twig`
//! metadata directory and anything matched by the ignore rules; snapshot
//! replacement (checkout, merge) writes the target contents and removes
//! tracked files that are no longer present, pruning directories left empty.

use crate::artifacts::ignore::IgnoreRules;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const METADATA_DIR: &str = ".twig";

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.path.join(relative_path).is_file()
    }

    pub fn read_file(&self, relative_path: &str) -> anyhow::Result<String> {
        let file_path = self.path.join(relative_path);
        std::fs::read_to_string(&file_path)
            .with_context(|| format!("unable to read file {}", file_path.display()))
    }

    pub fn write_file(&self, relative_path: &str, content: &str) -> anyhow::Result<()> {
        let file_path = self.path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)
            .with_context(|| format!("unable to write file {}", file_path.display()))
    }

    /// Every file under the workspace root, repo-relative, skipping the
    /// metadata directory and ignored paths.
    pub fn list_files(&self, ignore: &IgnoreRules) -> anyhow::Result<Vec<PathBuf>> {
        Ok(WalkDir::new(&self.path)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                (!ignore.is_ignored(relative)).then(|| relative.to_path_buf())
            })
            .collect())
    }

    /// Overwrite the working snapshot with the given contents: write every
    /// entry, delete listed files that are not part of the snapshot, prune
    /// directories left empty. Ignored files are left alone.
    pub fn replace_with(
        &self,
        contents: &BTreeMap<String, String>,
        ignore: &IgnoreRules,
    ) -> anyhow::Result<()> {
        for (path, content) in contents {
            self.write_file(path, content)?;
        }

        for existing in self.list_files(ignore)? {
            let key = existing.to_string_lossy().to_string();
            if !contents.contains_key(&key) {
                let full = self.path.join(&existing);
                std::fs::remove_file(&full)
                    .with_context(|| format!("unable to remove file {}", full.display()))?;
                self.prune_empty_parent_dirs(&full)?;
            }
        }

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
