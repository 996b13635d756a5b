//! Rar archive extraction via the unrar library

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use unrar::error::{Code, UnrarError};

/// Extract every entry of a rar archive into `output_dir`.
///
/// Rar is extraction-only: the format is proprietary and we never create
/// rar archives. Encrypted archives fail with a password error.
pub fn extract_rar(archive_path: &Path, output_dir: &Path) -> Result<()> {
    debug!("Extracting rar {:?} to {:?}", archive_path, output_dir);

    let map_err = |e: UnrarError| map_rar_error(e, archive_path);

    let mut archive = unrar::Archive::new(archive_path)
        .open_for_processing()
        .map_err(map_err)?;

    while let Some(header) = archive.read_header().map_err(map_err)? {
        let entry_path = output_dir.join(&header.entry().filename);
        archive = if header.entry().is_file() {
            debug!("Extracting: {:?}", header.entry().filename);
            if let Some(parent) = entry_path.parent() {
                fs::create_dir_all(parent)?;
            }
            header.extract_to(&entry_path).map_err(map_err)?
        } else {
            header.skip().map_err(map_err)?
        };
    }

    Ok(())
}

fn map_rar_error(err: UnrarError, archive_path: &Path) -> Error {
    match err.code {
        Code::MissingPassword => Error::PasswordRequired(archive_path.to_path_buf()),
        Code::BadPassword => Error::PasswordIncorrect(archive_path.to_path_buf()),
        _ => Error::CorruptArchive(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_corrupt_rar() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.rar");
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(&archive, b"Rar!\x1a\x07\x00garbage").unwrap();

        assert!(extract_rar(&archive, &out).is_err());
    }
}
