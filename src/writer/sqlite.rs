//! Component E.1 — SQLite Sink (`elements.db`).

use std::path::Path;

use indicatif::ProgressBar;
use rusqlite::Connection;
use tempfile::TempPath;
use tracing::info;

use crate::callstack::format_callstack;
use crate::error::ConvertError;
use crate::model::{Element, Trajectory};

const SCHEMA: &str = "CREATE TABLE allocs (
    idx INTEGER PRIMARY KEY,
    size INTEGER,
    start_time INTEGER,
    end_time INTEGER,
    callstack TEXT
);";

/// Rows are committed in batches of this size (`spec.md` §4.E.1, §9 "Bulk
/// insertion") rather than relying on autocommit, which would dominate
/// runtime on large traces.
const INSERT_BATCH_SIZE: usize = 10_000;

/// Build the SQLite database for `trajectories` (excluding the summary
/// entry) and `elements`, writing it to a temp file in `dest`'s parent
/// directory. Returns the temp path so the caller can persist it (or
/// discard it) together with the JSON sink's outcome.
pub fn write(
    trajectories: &[Trajectory],
    elements: &[Element],
    dest: &Path,
    progress: &ProgressBar,
) -> Result<TempPath, ConvertError> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(parent)?.into_temp_path();

    {
        let mut conn = Connection::open(&tmp)?;
        conn.execute_batch(SCHEMA)?;

        progress.set_length(trajectories.len() as u64);
        for (batch_no, batch) in trajectories.chunks(INSERT_BATCH_SIZE).enumerate() {
            let start_idx = batch_no * INSERT_BATCH_SIZE;
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("INSERT INTO allocs VALUES (?1, ?2, ?3, ?4, ?5)")?;
                for (offset, traj) in batch.iter().enumerate() {
                    let idx = start_idx + offset;
                    let (size, start_time, end_time) = match traj {
                        Trajectory::Regular {
                            timesteps, size, ..
                        } => (
                            *size,
                            *timesteps.first().expect("trajectory always has a start"),
                            *timesteps.last().expect("trajectory always has an end"),
                        ),
                        Trajectory::Summary { .. } => {
                            unreachable!("summary trajectory must be excluded before writing")
                        }
                    };
                    let callstack = format_callstack(&elements[idx].frames);
                    stmt.execute(rusqlite::params![
                        idx as i64,
                        size,
                        start_time,
                        end_time,
                        callstack
                    ])?;
                }
            }
            tx.commit()?;
            progress.inc(batch.len() as u64);
        }
        // `conn` is dropped here, closing the connection before the file
        // is moved into place.
    }

    progress.finish_and_clear();
    info!("wrote {} allocation rows to temp database", trajectories.len());
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    fn element(size: i64) -> Element {
        Element {
            addr: 0,
            size,
            frames: vec![],
            kind: ElementKind::Allocation,
        }
    }

    #[test]
    fn writes_one_row_per_trajectory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("elements.db");

        let trajectories = vec![
            Trajectory::Regular {
                elem: 0,
                timesteps: vec![0, 0],
                offsets: vec![0, 0],
                size: 10,
                color: 0,
            },
            Trajectory::Regular {
                elem: 1,
                timesteps: vec![0, 1],
                offsets: vec![0, 0],
                size: 20,
                color: 1,
            },
        ];
        let elements = vec![element(10), element(20)];

        let tmp = write(&trajectories, &elements, &dest, &ProgressBar::hidden()).unwrap();
        tmp.persist(&dest).unwrap();

        let conn = Connection::open(&dest).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM allocs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let row: (i64, i64, i64, i64) = conn
            .query_row(
                "SELECT idx, size, start_time, end_time FROM allocs WHERE idx = 0",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(row, (0, 10, 0, 0));
    }
}
