//! Component A — Snapshot Reader.
//!
//! Decodes the input snapshot container and locates the event trace for a
//! requested device index. The reader is deliberately format-agnostic: it
//! operates on an already-decoded `serde_json::Value`, the same way the
//! original implementation's `get_trace` operated on an already-unpickled
//! `dict` (`original_source/convert_snap_sql.py`).

use serde_json::Value;
use tracing::debug;

use crate::error::ConvertError;
use crate::model::Event;

/// Locate and decode the event trace for `device_id` within `snapshot`.
///
/// `snapshot` must be an object with a `device_traces` key mapping to an
/// array of per-device event arrays (`spec.md` §6).
pub fn read_device_trace(snapshot: &Value, device_id: usize) -> Result<Vec<Event>, ConvertError> {
    let traces = snapshot
        .get("device_traces")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ConvertError::DecodeError("missing or non-array `device_traces` key".to_string())
        })?;

    if device_id >= traces.len() {
        let expected = if traces.len() == 1 {
            "0".to_string()
        } else {
            format!("0..{}", traces.len().saturating_sub(1))
        };
        return Err(ConvertError::DeviceOutOfRange {
            expected,
            got: device_id,
        });
    }

    let raw_trace = &traces[device_id];
    let events: Vec<Event> = serde_json::from_value(raw_trace.clone())
        .map_err(|e| ConvertError::DecodeError(format!("device {device_id} trace: {e}")))?;

    if events.is_empty() {
        let with_trace: Vec<usize> = traces
            .iter()
            .enumerate()
            .filter(|(_, tr)| tr.as_array().map(|a| !a.is_empty()).unwrap_or(false))
            .map(|(i, _)| i)
            .collect();
        return Err(ConvertError::EmptyDevice {
            device: device_id,
            with_trace,
        });
    }

    debug!(
        "device {} trace decoded: {} events",
        device_id,
        events.len()
    );
    Ok(events)
}
