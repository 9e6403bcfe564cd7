use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A candidate data file shown by the setup picker.
#[derive(Clone, Debug)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl FileEntry {
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

/// `.csv` files (case-insensitive extension) directly inside `dir`, newest first.
/// An unreadable directory yields an empty list.
pub fn list_csv_files(dir: impl AsRef<Path>) -> Vec<FileEntry> {
    let Ok(read_dir) = fs::read_dir(dir.as_ref()) else {
        return Vec::new();
    };

    let mut entries: Vec<FileEntry> = read_dir
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let metadata = entry.metadata().ok()?;
            if !is_csv || !metadata.is_file() {
                return None;
            }
            let name = path.file_name()?.to_str()?.to_string();
            Some(FileEntry {
                name,
                modified: metadata.modified().unwrap_or(UNIX_EPOCH),
                size: metadata.len(),
                path,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    entries
}
