//! Tar archive extraction, optionally wrapped in a stream compressor

use crate::{Error, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tar::Archive;
use tracing::{debug, warn};

/// Stream compression wrapped around the tar payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

/// Extract a tar archive (plain or compressed) into `output_dir`.
pub fn extract_tar(archive_path: &Path, output_dir: &Path, compression: Compression) -> Result<()> {
    debug!(
        "Extracting tar ({:?}) {:?} to {:?}",
        compression, archive_path, output_dir
    );

    let file = File::open(archive_path)?;

    match compression {
        Compression::None => extract_entries(&mut Archive::new(file), output_dir),
        Compression::Gzip => {
            let decoder = flate2::read::GzDecoder::new(file);
            extract_entries(&mut Archive::new(decoder), output_dir)
        }
        Compression::Bzip2 => {
            let decoder = bzip2::read::BzDecoder::new(file);
            extract_entries(&mut Archive::new(decoder), output_dir)
        }
        Compression::Xz => {
            let decoder = xz2::read::XzDecoder::new(file);
            extract_entries(&mut Archive::new(decoder), output_dir)
        }
    }
}

fn extract_entries<R: Read>(archive: &mut Archive<R>, output_dir: &Path) -> Result<()> {
    for entry in archive.entries().map_err(map_tar_error)? {
        let mut entry = entry.map_err(map_tar_error)?;
        let path = entry.path().map_err(map_tar_error)?;
        let dest_path = output_dir.join(&path);

        debug!("Extracting: {:?}", path);

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Last-writer-wins at the destination
        if dest_path.is_file() {
            fs::remove_file(&dest_path)?;
        }

        match entry.header().entry_type() {
            tar::EntryType::Symlink | tar::EntryType::Link => {
                // unpack handles links; a dangling target is non-fatal
                if let Err(e) = entry.unpack(&dest_path) {
                    warn!("Skipping link {:?}: {}", dest_path, e);
                }
            }
            _ => {
                entry.unpack(&dest_path).map_err(map_tar_error)?;
            }
        }
    }

    Ok(())
}

// The tar crate surfaces malformed archives as io errors with
// InvalidData/UnexpectedEof kinds; fold those into the corrupt bucket so
// they are distinguishable from real filesystem failures.
fn map_tar_error(err: std::io::Error) -> Error {
    match err.kind() {
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
            Error::CorruptArchive(err.to_string())
        }
        _ => Error::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn build_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("data.tar.gz");
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();

        build_tar_gz(&archive, &[("a.txt", b"alpha"), ("sub/b.txt", b"beta")]);
        extract_tar(&archive, &out, Compression::Gzip).unwrap();

        assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(out.join("sub/b.txt")).unwrap(), b"beta");
    }

    #[test]
    fn test_extract_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("data.tar.gz");
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("a.txt"), b"stale").unwrap();

        build_tar_gz(&archive, &[("a.txt", b"fresh")]);
        extract_tar(&archive, &out, Compression::Gzip).unwrap();

        assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"fresh");
    }

    #[test]
    fn test_extract_corrupt_tar() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.tar");
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(&archive, b"this is not a tar archive at all............").unwrap();

        let err = extract_tar(&archive, &out, Compression::None).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptArchive(_) | Error::Io(_)
        ));
    }
}
