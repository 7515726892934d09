use derive_new::new;
use std::path::PathBuf;

#[derive(Debug, Clone, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(spec: FileSpec) {
    if let Some(parent) = spec.path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    std::fs::write(&spec.path, &spec.content).expect("failed to write file");
}

pub fn read_file(path: &PathBuf) -> String {
    std::fs::read_to_string(path).expect("failed to read file")
}
