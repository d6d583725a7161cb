//! Component E — Artifact Writer.
//!
//! Streams the simulator's trajectories to JSON and bulk-inserts
//! allocation metadata into SQLite (`spec.md` §4.E). Both sinks write to
//! temp files first; they are persisted together only once both have
//! succeeded, so the destination directory never holds a partial result
//! (`spec.md` §7, §9 "Temporary file discipline").

pub mod json;
pub mod sqlite;

use std::path::Path;

use indicatif::ProgressBar;
use tracing::info;

use crate::error::ConvertError;
use crate::model::{Element, Trajectory};

pub const ALLOCATIONS_FILE_NAME: &str = "allocations.json";
pub const DATABASE_FILE_NAME: &str = "elements.db";

/// Write both artifacts into `output_dir`, creating it if necessary.
pub fn write_artifacts(
    trajectories: &[Trajectory],
    elements: &[Element],
    output_dir: &Path,
) -> Result<(), ConvertError> {
    std::fs::create_dir_all(output_dir)?;

    let json_dest = output_dir.join(ALLOCATIONS_FILE_NAME);
    let db_dest = output_dir.join(DATABASE_FILE_NAME);

    if db_dest.exists() {
        return Err(ConvertError::DestinationExists(db_dest));
    }
    if json_dest.exists() {
        return Err(ConvertError::DestinationExists(json_dest));
    }

    let json_tmp = json::write(trajectories, &json_dest)?;
    let db_tmp = sqlite::write(trajectories, elements, &db_dest, &ProgressBar::hidden())?;

    // Persist together, or neither: if the JSON file lands but the
    // database rename fails, remove the JSON file before returning.
    json_tmp.persist(&json_dest).map_err(|e| e.error)?;
    if let Err(e) = db_tmp.persist(&db_dest) {
        let _ = std::fs::remove_file(&json_dest);
        return Err(e.error.into());
    }

    info!(
        "wrote {} and {} to {}",
        ALLOCATIONS_FILE_NAME,
        DATABASE_FILE_NAME,
        output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn refuses_to_overwrite_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DATABASE_FILE_NAME), b"not a db").unwrap();

        let trajectories = vec![Trajectory::Regular {
            elem: 0,
            timesteps: vec![0, 0],
            offsets: vec![0, 0],
            size: 10,
            color: 0,
        }];
        let elements = vec![Element {
            addr: 0,
            size: 10,
            frames: vec![],
            kind: ElementKind::Allocation,
        }];

        let err = write_artifacts(&trajectories, &elements, dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::DestinationExists(_)));
    }

    #[test]
    fn writes_both_artifacts_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let trajectories = vec![Trajectory::Regular {
            elem: 0,
            timesteps: vec![0, 0],
            offsets: vec![0, 0],
            size: 10,
            color: 0,
        }];
        let elements = vec![Element {
            addr: 0,
            size: 10,
            frames: vec![],
            kind: ElementKind::Allocation,
        }];

        write_artifacts(&trajectories, &elements, &out).unwrap();
        assert!(out.join(ALLOCATIONS_FILE_NAME).exists());
        assert!(out.join(DATABASE_FILE_NAME).exists());
    }
}
