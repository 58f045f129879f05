//! BLAKE3 hashing for written artifacts.

use std::path::Path;

/// Hex-encoded BLAKE3 hash of a byte slice.
pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Hex-encoded BLAKE3 hash of a file's contents.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(hash_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"avatar").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"avatar"));
        assert_eq!(hash_bytes(b"avatar").len(), 64);
    }
}
