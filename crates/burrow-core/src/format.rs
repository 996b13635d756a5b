//! Archive format resolution by file name suffix

use std::path::{Path, PathBuf};

/// Supported archive kinds, derived from the file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    SevenZip,
    Zip,
    TarGz,
    Tar,
    TarBz2,
    TarXz,
    Rar,
    Unknown,
}

impl ArchiveKind {
    /// Whether this kind can be handed to an archive opener
    pub fn is_archive(self) -> bool {
        self != ArchiveKind::Unknown
    }
}

// Compound suffixes must precede their single-suffix substrings so that
// `.tar.gz` is not shadowed by a bare `.gz` miss.
const SUFFIXES: &[(&str, ArchiveKind)] = &[
    (".tar.gz", ArchiveKind::TarGz),
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar.xz", ArchiveKind::TarXz),
    (".tgz", ArchiveKind::TarGz),
    (".tbz2", ArchiveKind::TarBz2),
    (".txz", ArchiveKind::TarXz),
    (".tar", ArchiveKind::Tar),
    (".zip", ArchiveKind::Zip),
    (".7z", ArchiveKind::SevenZip),
    (".rar", ArchiveKind::Rar),
];

/// Classify a path as one of the supported archive kinds.
///
/// Pure function of the file name, case-insensitive, no I/O. Any
/// unrecognized suffix (or no suffix at all) yields `Unknown`.
pub fn classify<P: AsRef<Path>>(path: P) -> ArchiveKind {
    match match_suffix(path.as_ref()) {
        Some((kind, _)) => kind,
        None => ArchiveKind::Unknown,
    }
}

/// Path with the archive suffix stripped: `site.tar.gz` -> `site`.
///
/// Used to derive a fresh extraction directory next to the archive.
/// Returns `None` when the path is not a recognized archive.
pub fn archive_stem(path: &Path) -> Option<PathBuf> {
    let (_, suffix_len) = match_suffix(path)?;
    let name = path.file_name()?.to_str()?;
    let stem = &name[..name.len() - suffix_len];
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

fn match_suffix(path: &Path) -> Option<(ArchiveKind, usize)> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix) && name.len() > suffix.len())
        .map(|&(suffix, kind)| (kind, suffix.len()))
}
