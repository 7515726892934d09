use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Stage a file, or every non-ignored file when given `.`.
    pub fn add(&self, raw_path: &str) -> anyhow::Result<()> {
        if raw_path == "." {
            for path in self.workspace().list_files(self.ignore())? {
                self.add_file(&path)?;
            }
        } else {
            self.add_file(Path::new(raw_path))?;
        }

        self.index().write_updates()
    }

    fn add_file(&self, path: &Path) -> anyhow::Result<()> {
        let relative = path.to_string_lossy().to_string();

        if !self.workspace().file_exists(&relative) {
            writeln!(self.writer(), "File not found: {relative}")?;
            return Ok(());
        }
        if self.ignore().is_ignored(path) {
            writeln!(self.writer(), "Ignoring file: {relative}")?;
            return Ok(());
        }

        let content = self.workspace().read_file(&relative)?;
        let blob_oid = self.database().store(&Blob::new(content))?;

        // unchanged files produce no index mutation
        if self.index().add(&relative, blob_oid) {
            writeln!(self.writer(), "Added {relative} to index")?;
        } else {
            writeln!(self.writer(), "No changes in {relative}")?;
        }

        Ok(())
    }
}
