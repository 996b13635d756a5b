//! Zip archive extraction

use crate::Result;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Extract every entry of a zip archive into `output_dir`.
pub fn extract_zip(archive_path: &Path, output_dir: &Path) -> Result<()> {
    debug!("Extracting zip {:?} to {:?}", archive_path, output_dir);

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        // enclosed_name rejects entries that would escape the output dir
        let outpath = match file.enclosed_name() {
            Some(path) => path.to_owned(),
            None => continue,
        };
        let dest_path = output_dir.join(&outpath);

        debug!("Extracting: {:?}", outpath);

        if file.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // File::create truncates, which gives last-writer-wins
        let mut outfile = File::create(&dest_path)?;
        std::io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
