//! Component E.2 — JSON Sink (`allocations.json`).

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ConvertError;
use crate::model::Trajectory;

/// Serialize `trajectories` (already excluding the summary entry) as a
/// single JSON array and persist it atomically to `dest`
/// (`spec.md` §4.E.2, §9 "Temporary file discipline").
///
/// Returns the temp file's path so the caller can roll both sinks back
/// together if the SQLite sink subsequently fails.
pub fn write(trajectories: &[Trajectory], dest: &Path) -> Result<NamedTempFile, ConvertError> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;

    info!(
        "serializing {} trajectories to {}",
        trajectories.len(),
        dest.display()
    );
    serde_json::to_writer(&mut tmp, trajectories).map_err(|e| match e.io_error_kind() {
        Some(kind) => ConvertError::Io(std::io::Error::new(kind, e)),
        None => ConvertError::Io(std::io::Error::other(e)),
    })?;
    tmp.flush()?;

    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Trajectory;

    #[test]
    fn writes_array_excluding_summary() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("allocations.json");

        let trajectories = vec![Trajectory::Regular {
            elem: 0,
            timesteps: vec![0, 0],
            offsets: vec![0, 0],
            size: 10,
            color: 0,
        }];

        let tmp = write(&trajectories, &dest).unwrap();
        let path = tmp.into_temp_path();
        path.persist(&dest).unwrap();

        let contents = std::fs::read_to_string(&dest).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["size"], 10);
        assert_eq!(value[0]["elem"], 0);
    }
}
