//! 7z archive extraction via sevenz-rust

use crate::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Extract every entry of a 7z archive into `output_dir`.
pub fn extract_7z(archive_path: &Path, output_dir: &Path) -> Result<()> {
    debug!("Extracting 7z {:?} to {:?}", archive_path, output_dir);

    sevenz_rust::decompress_file(archive_path, output_dir)
        .map_err(|e| map_sevenz_error(e, archive_path))
}

fn map_sevenz_error(err: sevenz_rust::Error, archive_path: &Path) -> Error {
    match err {
        sevenz_rust::Error::PasswordRequired => {
            Error::PasswordRequired(archive_path.to_path_buf())
        }
        sevenz_rust::Error::MaybeBadPassword(_) => {
            Error::PasswordIncorrect(archive_path.to_path_buf())
        }
        sevenz_rust::Error::Io(e, _) => Error::Io(e),
        sevenz_rust::Error::FileOpen(e, _) => Error::Io(e),
        other => Error::CorruptArchive(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_corrupt_7z() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.7z");
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(&archive, b"not a real 7z payload").unwrap();

        let err = extract_7z(&archive, &out).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive(_)));
    }
}
