use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{MergeOutcome, MergedRecord};

fn output_err(path: &Path, message: impl ToString) -> ReconError {
    ReconError::Output { path: path.to_path_buf(), message: message.to_string() }
}

/// Sibling path the document is staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Serialize `value` into the staging file next to `path` and flush it to
/// disk. The target itself is untouched. On failure nothing is left behind.
fn stage_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, ReconError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| output_err(path, e))?;
    }

    let staging = staging_path(path);
    let result = (|| -> Result<(), ReconError> {
        let file = fs::File::create(&staging).map_err(|e| output_err(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| output_err(path, e))?;
        writer.write_all(b"\n").map_err(|e| output_err(path, e))?;
        let file = writer.into_inner().map_err(|e| output_err(path, e.error()))?;
        file.sync_all().map_err(|e| output_err(path, e))
    })();

    match result {
        Ok(()) => Ok(staging),
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

/// Move a staged file over its target.
fn commit(staging: &Path, path: &Path) -> Result<(), ReconError> {
    fs::rename(staging, path).map_err(|e| {
        let _ = fs::remove_file(staging);
        output_err(path, e)
    })
}

/// Write `value` as pretty JSON. The target is replaced in a single rename, so
/// readers never observe a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReconError> {
    let staging = stage_json(path, value)?;
    commit(&staging, path)
}

/// Write the merged dataset and the unmatched report. Call only once the
/// whole merge is in memory.
///
/// Both documents are staged before either target is replaced, so a failure
/// while serializing or writing leaves the previous pair untouched.
pub fn write_outcome(
    outcome: &MergeOutcome,
    merged_path: &Path,
    unmatched_path: &Path,
) -> Result<(), ReconError> {
    let merged_staging = stage_json(merged_path, &outcome.merged)?;
    let unmatched_staging = match stage_json(unmatched_path, &outcome.unmatched) {
        Ok(staging) => staging,
        Err(e) => {
            let _ = fs::remove_file(&merged_staging);
            return Err(e);
        }
    };

    if let Err(e) = commit(&merged_staging, merged_path) {
        let _ = fs::remove_file(&unmatched_staging);
        return Err(e);
    }
    log::info!("wrote {} merged records to {}", outcome.merged.len(), merged_path.display());

    commit(&unmatched_staging, unmatched_path)?;
    log::info!(
        "wrote {} unmatched establishments to {}",
        outcome.unmatched.len(),
        unmatched_path.display()
    );
    Ok(())
}

/// Read a merged dataset back, e.g. for catalog queries.
pub fn load_merged(path: &Path) -> Result<Vec<MergedRecord>, ReconError> {
    let file = fs::File::open(path).map_err(|source| ReconError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ReconError::MergedParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
