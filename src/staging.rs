use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::error::Result;

// Sortable, separator-free: 250802143015 for 2025-08-02 14:30:15 local time.
const BACKUP_TIMESTAMP_FORMAT: &str = "%y%m%d%H%M%S";

/// Prepare a fresh staging directory for `model_id` under `staging_root`.
///
/// An existing directory with the same name is renamed aside to
/// `<model_id>-bak-<timestamp>` so artifacts from earlier saves are never
/// clobbered.
pub fn prepare_model_dir(staging_root: &Path, model_id: &str) -> Result<PathBuf> {
    let model_dir = staging_root.join(model_id);

    if model_dir.is_dir() {
        let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup = staging_root.join(format!("{}-bak-{}", model_id, stamp));
        info!(
            "Moving existing model dir {} aside to {}",
            model_dir.display(),
            backup.display()
        );
        fs::rename(&model_dir, &backup)?;
    }

    fs::create_dir_all(&model_dir)?;
    Ok(model_dir)
}
