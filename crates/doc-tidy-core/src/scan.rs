//! Document enumeration.
//!
//! Walks a target directory and yields the relative paths of candidate
//! documents: files with the configured extension, outside excluded
//! directories. Unreadable directories are reported as warnings and the
//! walk continues elsewhere.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{DocTidyError, Result};

/// Result of one enumeration pass
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Candidate documents, relative to the scan root, in stable order
    pub documents: Vec<PathBuf>,
    /// Non-fatal enumeration errors
    pub warnings: Vec<String>,
}

/// ドキュメント列挙器
pub struct DocumentScanner {
    extension: String,
    exclude_dirs: Vec<String>,
}

impl DocumentScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    /// Whether a path is excluded from scanning. An exclusion entry
    /// matches as a substring of the path, so build-artifact directory
    /// names anywhere in the path prune the subtree.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude_dirs.iter().any(|d| path_str.contains(d.as_str()))
    }

    /// Enumerate candidate documents under `root`.
    ///
    /// The sequence is finite and sorted by file name for deterministic
    /// ordering across runs on the same tree.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome> {
        if !root.exists() {
            return Err(DocTidyError::TargetNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut outcome = ScanOutcome::default();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let rel = e.path().strip_prefix(root).unwrap_or(e.path());
                !self.is_excluded(rel)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    outcome.warnings.push(format!("scan error: {}", e));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let matches_extension = entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
                .unwrap_or(false);
            if !matches_extension {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            outcome.documents.push(rel);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner() -> DocumentScanner {
        DocumentScanner::new(&ScanConfig::default())
    }

    #[test]
    fn test_scan_yields_markdown_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "# readme");
        write(dir.path(), "docs/guide-setup.md", "# guide");
        write(dir.path(), "notes.txt", "not markdown");

        let outcome = scanner().scan(dir.path()).unwrap();
        assert_eq!(
            outcome.documents,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("docs/guide-setup.md")
            ]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "kept.md", "x");
        write(dir.path(), "node_modules/pkg/README.md", "x");
        write(dir.path(), "sub/target/out.md", "x");

        let outcome = scanner().scan(dir.path()).unwrap();
        assert_eq!(outcome.documents, vec![PathBuf::from("kept.md")]);
    }

    #[test]
    fn test_exclusion_matches_as_substring() {
        let s = scanner();
        assert!(s.is_excluded(Path::new("a/node_modules/b.md")));
        assert!(s.is_excluded(Path::new("node_modules-cache/b.md")));
        assert!(!s.is_excluded(Path::new("docs/modules.md")));
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "UPPER.MD", "x");

        let outcome = scanner().scan(dir.path()).unwrap();
        assert_eq!(outcome.documents, vec![PathBuf::from("UPPER.MD")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = scanner().scan(Path::new("/no/such/dir/doc-tidy")).unwrap_err();
        assert!(matches!(err, DocTidyError::TargetNotFound { .. }));
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.md", "x");
        write(dir.path(), "a.md", "x");
        write(dir.path(), "c.md", "x");

        let first = scanner().scan(dir.path()).unwrap();
        let second = scanner().scan(dir.path()).unwrap();
        assert_eq!(first.documents, second.documents);
        assert_eq!(first.documents[0], PathBuf::from("a.md"));
    }
}
