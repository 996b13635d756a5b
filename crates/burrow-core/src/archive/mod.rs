//! Archive openers, one per format family
//!
//! Each opener extracts every member entry of an archive into a target
//! directory, creating it if absent. Existing files at the destination are
//! overwritten (last-writer-wins); callers that need isolation give each
//! job its own fresh target directory. Openers never delete the source
//! archive.

pub mod rar;
pub mod sevenz;
pub mod tar;
pub mod zip;

use crate::format::ArchiveKind;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Extract `archive` of the given kind into `target_dir`.
pub fn extract(kind: ArchiveKind, archive: &Path, target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    match kind {
        ArchiveKind::Zip => zip::extract_zip(archive, target_dir),
        ArchiveKind::Tar => tar::extract_tar(archive, target_dir, tar::Compression::None),
        ArchiveKind::TarGz => tar::extract_tar(archive, target_dir, tar::Compression::Gzip),
        ArchiveKind::TarBz2 => tar::extract_tar(archive, target_dir, tar::Compression::Bzip2),
        ArchiveKind::TarXz => tar::extract_tar(archive, target_dir, tar::Compression::Xz),
        ArchiveKind::SevenZip => sevenz::extract_7z(archive, target_dir),
        ArchiveKind::Rar => rar::extract_rar(archive, target_dir),
        ArchiveKind::Unknown => Err(Error::UnsupportedFormat(
            archive.to_string_lossy().into_owned(),
        )),
    }
}
