//! The types shared across the pipeline: raw events as decoded from the
//! snapshot, the persistent `Element`s the classifier produces from them,
//! and the `Trajectory` polylines the simulator produces from those.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// A single frame of a call stack, as recorded on an allocation event.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Frame {
    pub filename: String,
    pub line: i64,
    pub name: String,
}

/// A raw event from a device's allocator instrumentation trace.
///
/// `addr` and `size` default to `0` and `frames` to empty: events whose
/// `action` is not one this pipeline recognizes are skipped outright (see
/// `classify::classify`), so their other fields need not decode cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub action: String,
    #[serde(default)]
    pub addr: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

/// How an `Element` came to exist: a real allocation event, or a
/// synthetic placeholder manufactured for a free whose matching
/// allocation predates the trace (an "orphan free", `spec.md` §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Allocation,
    OrphanFree,
}

/// A persistent, index-addressed record derived from an event. Elements
/// are never removed once classified; their dense index is their identity
/// for the remainder of the run.
#[derive(Debug, Clone)]
pub struct Element {
    pub addr: i64,
    pub size: i64,
    pub frames: Vec<Frame>,
    pub kind: ElementKind,
}

impl Element {
    pub fn from_event(event: &Event, kind: ElementKind) -> Self {
        Element {
            addr: event.addr,
            size: event.size,
            frames: event.frames.clone(),
            kind,
        }
    }
}

/// The polyline recording one block's packed offset over logical time, or
/// the degenerate aggregate "summary" track (`spec.md` §3, §4.C).
#[derive(Debug, Clone)]
pub enum Trajectory {
    Regular {
        elem: usize,
        timesteps: Vec<i64>,
        offsets: Vec<i64>,
        size: i64,
        color: i64,
    },
    Summary {
        timesteps: Vec<i64>,
        offsets: Vec<i64>,
        size: Vec<i64>,
    },
}

impl Trajectory {
    pub fn timesteps(&self) -> &[i64] {
        match self {
            Trajectory::Regular { timesteps, .. } => timesteps,
            Trajectory::Summary { timesteps, .. } => timesteps,
        }
    }

    pub fn offsets(&self) -> &[i64] {
        match self {
            Trajectory::Regular { offsets, .. } => offsets,
            Trajectory::Summary { offsets, .. } => offsets,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, Trajectory::Summary { .. })
    }
}

/// Serializes to the exact field layout `spec.md` §4.E.2 specifies:
/// `elem`, `timesteps`, `offsets`, `size`, `color`. `elem` is the sentinel
/// string `"summarized"` for the summary track and the element's index
/// otherwise; `color` is `0` for the summary track.
impl Serialize for Trajectory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        match self {
            Trajectory::Regular {
                elem,
                timesteps,
                offsets,
                size,
                color,
            } => {
                let mut s = serializer.serialize_struct("Trajectory", 5)?;
                s.serialize_field("elem", elem)?;
                s.serialize_field("timesteps", timesteps)?;
                s.serialize_field("offsets", offsets)?;
                s.serialize_field("size", size)?;
                s.serialize_field("color", color)?;
                s.end()
            }
            Trajectory::Summary {
                timesteps,
                offsets,
                size,
            } => {
                let mut s = serializer.serialize_struct("Trajectory", 5)?;
                s.serialize_field("elem", "summarized")?;
                s.serialize_field("timesteps", timesteps)?;
                s.serialize_field("offsets", offsets)?;
                s.serialize_field("size", size)?;
                s.serialize_field("color", &0i64)?;
                s.end()
            }
        }
    }
}

/// Accepted for symmetry with the JSON sink's output and for tests that
/// round-trip fixtures; not used by the core pipeline itself, which only
/// ever writes trajectories.
impl<'de> Deserialize<'de> for Trajectory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            elem: serde_json::Value,
            timesteps: Vec<i64>,
            offsets: Vec<i64>,
            size: serde_json::Value,
            #[allow(dead_code)]
            color: i64,
        }

        let raw = Raw::deserialize(deserializer)?;
        match raw.elem {
            serde_json::Value::String(ref s) if s == "summarized" => {
                let size: Vec<i64> = serde_json::from_value(raw.size).map_err(de::Error::custom)?;
                Ok(Trajectory::Summary {
                    timesteps: raw.timesteps,
                    offsets: raw.offsets,
                    size,
                })
            }
            serde_json::Value::Number(n) => {
                let elem = n.as_u64().ok_or_else(|| de::Error::custom("elem index out of range"))? as usize;
                let size: i64 = serde_json::from_value(raw.size).map_err(de::Error::custom)?;
                Ok(Trajectory::Regular {
                    elem,
                    timesteps: raw.timesteps,
                    offsets: raw.offsets,
                    size,
                    color: elem as i64,
                })
            }
            other => Err(de::Error::custom(format!(
                "unexpected `elem` value: {other:?}"
            ))),
        }
    }
}
