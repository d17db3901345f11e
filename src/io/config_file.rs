//! Config-document file access.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read the config document text.
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read config file {}", path.display()))
}

/// Atomically overwrite the config document (temp file + rename).
///
/// Callers must only reach this after parsing and patching succeeded; a
/// document that failed validation is never written back.
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("patched.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_contents_without_leftover_temp() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(&path, "old").expect("seed");

        write_document(&path, "new").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
        assert_eq!(fs::read_dir(temp.path()).expect("dir").count(), 1);
    }
}
