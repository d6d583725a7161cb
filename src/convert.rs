//! The orchestrator tying components A through E together
//! (`spec.md` §6, "Invocation surface (minimal)").

use std::io::IsTerminal;
use std::path::Path;

use indicatif::ProgressBar;
use serde_json::Value;
use tracing::info;

use crate::classify::{self, Classified};
use crate::error::ConvertError;
use crate::simulate;
use crate::snapshot;
use crate::writer;

fn progress_bar() -> ProgressBar {
    if std::io::stderr().is_terminal() {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    }
}

/// Run the full pipeline: decode `snapshot`'s trace for `device_id`,
/// classify and replay its events, and write both artifacts into
/// `output_dir`.
pub fn convert(snapshot: &Value, output_dir: &Path, device_id: usize) -> Result<(), ConvertError> {
    info!("reading device {} trace from snapshot", device_id);
    let events = snapshot::read_device_trace(snapshot, device_id)?;
    info!("{} events in trace", events.len());

    let Classified { elements, actions } = classify::classify(&events, &progress_bar());
    let initial = classify::initially_allocated(&elements);
    info!(
        "{} elements, {} actions, {} initially-allocated placeholders",
        elements.len(),
        actions.len(),
        initial.len()
    );

    let sim = simulate::run(&elements, &actions, &initial, &progress_bar());
    let trajectories = sim.trajectories_excluding_summary();
    info!(
        "{} regular trajectories, peak live memory {}",
        trajectories.len(),
        sim.stats.max_size
    );

    writer::write_artifacts(trajectories, &elements, output_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn end_to_end_s2_alloc_then_free() {
        let snapshot = json!({
            "device_traces": [[
                {"action": "alloc", "addr": 1, "size": 10, "frames": []},
                {"action": "free", "addr": 1, "size": 0, "frames": []},
            ]]
        });

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        convert(&snapshot, &out, 0).unwrap();

        let json_contents =
            std::fs::read_to_string(out.join("allocations.json")).unwrap();
        let allocations: serde_json::Value = serde_json::from_str(&json_contents).unwrap();
        assert_eq!(allocations.as_array().unwrap().len(), 1);
        assert_eq!(allocations[0]["timesteps"], json!([0, 1]));
        assert_eq!(allocations[0]["offsets"], json!([0, 0]));

        let conn = Connection::open(out.join("elements.db")).unwrap();
        let row: (i64, i64, i64, i64, String) = conn
            .query_row(
                "SELECT idx, size, start_time, end_time, callstack FROM allocs WHERE idx = 0",
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .unwrap();
        assert_eq!(row, (0, 10, 0, 1, String::new()));
    }

    #[test]
    fn s6_device_selection_errors() {
        let snapshot = json!({"device_traces": [[], [
            {"action": "alloc", "addr": 1, "size": 1, "frames": []},
        ]]});
        let dir = tempfile::tempdir().unwrap();

        let err = convert(&snapshot, &dir.path().join("a"), 0).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyDevice { device: 0, .. }));

        let err = convert(&snapshot, &dir.path().join("b"), 2).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::DeviceOutOfRange { ref expected, got: 2 } if expected == "0..1"
        ));
    }

    #[test]
    fn no_partial_output_on_pre_existing_destination() {
        let snapshot = json!({"device_traces": [[
            {"action": "alloc", "addr": 1, "size": 10, "frames": []},
        ]]});
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.path().join("elements.db"), b"stale").unwrap();

        let err = convert(&snapshot, dir.path(), 0).unwrap_err();
        assert!(matches!(err, ConvertError::DestinationExists(_)));
        assert!(!dir.path().join("allocations.json").exists());
    }
}
