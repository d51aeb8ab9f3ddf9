use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::{PublishError, Result};

/// Zip every regular file under `source` into the archive at `destination`.
///
/// Entry names are the paths relative to the canonicalized `source`, using
/// the platform path separator; consumers on other platforms normalize
/// separators themselves. Walk order is whatever the directory traversal
/// yields. An existing file at `destination` is replaced outright. On
/// failure a partial archive is left on disk.
pub fn zip_dir(source: &Path, destination: &Path) -> Result<()> {
    let canonical_source = source.canonicalize()?;

    let mut archive = ZipWriter::new(File::create(destination)?);
    let options = FileOptions::default();

    let mut entries = 0usize;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| PublishError::Archive(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        // Canonicalize before taking the relative path so symlinked staging
        // roots still yield names relative to the real source directory.
        let canonical = entry.path().canonicalize()?;
        let name = canonical
            .strip_prefix(&canonical_source)
            .map_err(|e| {
                PublishError::Archive(format!(
                    "entry {} is outside {}: {}",
                    canonical.display(),
                    canonical_source.display(),
                    e
                ))
            })?
            .to_string_lossy()
            .into_owned();

        debug!("Adding archive entry {}", name);
        archive.start_file(name, options)?;
        let mut reader = BufReader::new(File::open(entry.path())?);
        io::copy(&mut reader, &mut archive)?;
        entries += 1;
    }

    archive.finish()?;
    info!(
        "Archived {} files from {} into {}",
        entries,
        source.display(),
        destination.display()
    );
    Ok(())
}
