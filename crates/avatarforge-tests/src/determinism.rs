//! Byte-identity checks for repeated runs.
//!
//! Two tools: [`verify_determinism`] compares in-memory outputs across runs,
//! and [`snapshot_dir`] captures every file in an output directory with its
//! BLAKE3 hash so two runs (or a run and a re-run) can be compared
//! file-by-file, including files that should no longer exist.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// The first difference, if any.
    pub diff_info: Option<DiffInfo>,
}

/// The first byte difference found between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the difference (the shorter length on a size mismatch).
    pub offset: usize,
    pub expected: Option<u8>,
    pub actual: Option<u8>,
    /// Which run (0-indexed) produced the differing output.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference at byte {}: expected {:02X?}, got {:02X?} (run {})",
            self.offset, self.expected, self.actual, self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\nRuns: {}\nHash: {}\n{}",
                self.runs, self.hash, diff
            );
        }
    }
}

/// Finds the first differing byte between two outputs.
pub fn first_difference(expected: &[u8], actual: &[u8]) -> Option<(usize, Option<u8>, Option<u8>)> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some((offset, expected.get(offset).copied(), actual.get(offset).copied()))
}

/// Run generation `runs` times and verify all outputs are identical.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = blake3::hash(reference).to_hex().to_string();

    for run_index in 1..runs {
        let output = generate_fn();
        if let Some((offset, expected, actual)) = first_difference(reference, output.as_ref()) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    expected,
                    actual,
                    run_index,
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        hash,
        diff_info: None,
    }
}

/// Every regular file under `dir`, keyed by relative path, with its hash.
pub fn snapshot_dir(dir: &Path) -> BTreeMap<PathBuf, String> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let data = std::fs::read(entry.path()).expect("Failed to read output file");
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            (rel, blake3::hash(&data).to_hex().to_string())
        })
        .collect()
}

/// File names (not paths) in a snapshot, sorted.
pub fn file_names(snapshot: &BTreeMap<PathBuf, String>) -> Vec<String> {
    snapshot
        .keys()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_outputs() {
        let result = verify_determinism(|| vec![1u8, 2, 3], 3);
        assert!(result.is_deterministic);
        result.assert_deterministic();
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(b"abc", b"abc"), None);
        assert_eq!(first_difference(b"abc", b"abd"), Some((2, Some(b'c'), Some(b'd'))));
        assert_eq!(first_difference(b"abc", b"ab"), Some((2, Some(b'c'), None)));
    }

    #[test]
    fn test_changing_output_detected() {
        let counter = std::cell::Cell::new(0u8);
        let result = verify_determinism(
            || {
                counter.set(counter.get() + 1);
                vec![0, counter.get()]
            },
            2,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.diff_info.unwrap().offset, 1);
    }

    #[test]
    fn test_snapshot_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("a.txt"), "a").unwrap();

        let snap = snapshot_dir(dir.path());
        assert_eq!(snap.len(), 2);
        assert_eq!(
            snap[Path::new("b.txt")],
            blake3::hash(b"b").to_hex().to_string()
        );
    }
}
