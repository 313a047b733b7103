//! Directory scanner for discovering hardware hash CSV exports

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Default file extension for input exports
pub const DEFAULT_EXTENSION: &str = "csv";

/// An input file found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Position in discovery order (0-based)
    pub index: usize,
}

impl SourceFile {
    /// File name used when reporting on this file
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Options controlling which files discovery returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Extension without the leading dot, matched case-sensitively
    pub extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Enumerate `.csv` files under `root`, sorted by full path
pub fn discover<P: AsRef<Path>>(root: P, recursive: bool) -> Vec<SourceFile> {
    discover_with(
        root,
        &ScanOptions {
            recursive,
            ..ScanOptions::default()
        },
    )
}

/// Enumerate files under `root` matching `options`, sorted by full path
///
/// Hidden files are ignored and hidden directories are never entered.
/// An empty result is not an error.
pub fn discover_with<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Vec<SourceFile> {
    let root = root.as_ref();
    let suffix = format!(".{}", options.extension);

    let mut walker = WalkDir::new(root).min_depth(1).follow_links(true);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.len() > suffix.len() && name.ends_with(&suffix));
        if matches {
            paths.push(entry.into_path());
        }
    }

    paths.sort_by_cached_key(|p| p.to_string_lossy().into_owned());
    debug!("discovered {} file(s) under {}", paths.len(), root.display());

    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| SourceFile { path, index })
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "a,b\n1,2\n").unwrap();
    }

    #[test]
    fn test_discover_top_level_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("a.csv"));
        touch(&dir.path().join("nested/c.csv"));

        let files = discover(dir.path(), false);
        let names: Vec<String> = files.iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(files[0].index, 0);
        assert_eq!(files[1].index, 1);
    }

    #[test]
    fn test_discover_recursive_includes_nested() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.csv"));
        touch(&dir.path().join("nested/deeper/c.csv"));

        let files = discover(dir.path(), true);
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.display_name() == "c.csv"));
    }

    #[test]
    fn test_discover_extension_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("upper.CSV"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("lower.csv"));

        let files = discover(dir.path(), false);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].display_name(), "lower.csv");
    }

    #[test]
    fn test_discover_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".hidden.csv"));
        touch(&dir.path().join(".cache/inner.csv"));
        touch(&dir.path().join("visible.csv"));

        let files = discover(dir.path(), true);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].display_name(), "visible.csv");
    }

    #[test]
    fn test_discover_empty_is_not_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), true).is_empty());
    }

    #[test]
    fn test_discover_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.csv"));
        touch(&dir.path().join("b.tsv"));

        let options = ScanOptions {
            recursive: false,
            extension: "tsv".to_string(),
        };
        let files = discover_with(dir.path(), &options);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].display_name(), "b.tsv");
    }
}
