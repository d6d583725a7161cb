//! Component C — Timeline Simulator.
//!
//! Replays the classified actions to reconstruct a packed memory layout
//! over synthetic logical time (`spec.md` §4.C). This is the core of the
//! pipeline: it owns the live set, the per-element trajectories, and the
//! aggregate summary track.

use indicatif::ProgressBar;
use tracing::debug;

use crate::model::{Element, Trajectory};

/// Simulator bookkeeping beyond the trajectories themselves. `max_size`
/// and `max_at_time` are not part of the canonical external contract
/// (`spec.md` §4.C.5 only exposes trajectories and elements) but are
/// retained since the original implementation computed and returned them
/// alongside the timeline (`original_source/convert_snap.py`), and they
/// fall out of `advance` for free.
pub struct SimulationStats {
    pub max_size: i64,
    pub max_at_time: Vec<i64>,
}

pub struct SimulationOutput {
    /// Regular trajectories in creation order, followed by the summary
    /// track last — the simulator's internal `data` list (`spec.md`
    /// §4.C.5). Callers that want the canonical external contract should
    /// use `SimulationOutput::trajectories_excluding_summary`.
    pub data: Vec<Trajectory>,
    pub stats: SimulationStats,
}

impl SimulationOutput {
    /// The canonical external output: trajectories with the trailing
    /// summary entry stripped (`spec.md` §4.C.5).
    pub fn trajectories_excluding_summary(&self) -> &[Trajectory] {
        &self.data[..self.data.len() - 1]
    }
}

struct LiveEntry {
    elem: usize,
    trajectory_idx: usize,
}

/// Owns every piece of mutable state the replay advances: logical time,
/// the running memory totals, and the summary track's three parallel
/// sequences. Mirrors the arena-and-index ownership design note in
/// `spec.md` §9 — everything here is addressed by index, never by
/// reference into the trajectory arena.
struct SimState {
    timestep: i64,
    total_mem: i64,
    total_summarized_mem: i64,
    max_size: i64,
    max_at_time: Vec<i64>,
    summary_timesteps: Vec<i64>,
    summary_offsets: Vec<i64>,
    summary_size: Vec<i64>,
}

impl SimState {
    fn new() -> Self {
        SimState {
            timestep: 0,
            total_mem: 0,
            total_summarized_mem: 0,
            max_size: 0,
            max_at_time: Vec::new(),
            summary_timesteps: Vec::new(),
            summary_offsets: vec![0],
            summary_size: Vec::new(),
        }
    }

    /// `spec.md` §4.C.1: record one summary sample, then advance
    /// `timestep` by `n`.
    fn advance(&mut self, n: i64) {
        self.summary_timesteps.push(self.timestep);
        self.summary_offsets.push(self.total_mem);
        self.summary_size.push(self.total_summarized_mem);
        self.timestep += n;
        for _ in 0..n {
            self.max_at_time
                .push(self.total_mem + self.total_summarized_mem);
        }
    }

    fn note_max(&mut self) {
        self.max_size = self
            .max_size
            .max(self.total_mem + self.total_summarized_mem);
    }

    fn into_summary_trajectory(self) -> (Trajectory, SimulationStats) {
        (
            Trajectory::Summary {
                timesteps: self.summary_timesteps,
                offsets: self.summary_offsets,
                size: self.summary_size,
            },
            SimulationStats {
                max_size: self.max_size,
                max_at_time: self.max_at_time,
            },
        )
    }
}

/// Run the simulator over `elements`/`actions` produced by the classifier.
/// `initially_allocated` is the subset of `elements` that are orphan-free
/// placeholders, in classification order (the caller processes them in
/// reverse, per `spec.md` §4.C.2).
pub fn run(
    elements: &[Element],
    actions: &[usize],
    initially_allocated: &[usize],
    progress: &ProgressBar,
) -> SimulationOutput {
    let mut state = SimState::new();
    let mut live: Vec<LiveEntry> = Vec::new();
    let mut data: Vec<Trajectory> = Vec::new();

    progress.set_length((initially_allocated.len() + actions.len()) as u64);

    // 4.C.2 — Initial allocations, reverse insertion order, no advance.
    for &e in initially_allocated.iter().rev() {
        let size = elements[e].size;
        live.push(LiveEntry {
            elem: e,
            trajectory_idx: data.len(),
        });
        data.push(Trajectory::Regular {
            elem: e,
            timesteps: vec![state.timestep],
            offsets: vec![state.total_mem],
            size,
            color: e as i64,
        });
        state.total_mem += size;
        progress.inc(1);
    }

    // 4.C.3 — Action replay.
    for &e in actions {
        let size = elements[e].size;

        // Tail-to-head scan for the most recently inserted live entry.
        let hit = live.iter().rposition(|entry| entry.elem == e);

        match hit {
            None => {
                // Miss: new allocation.
                live.push(LiveEntry {
                    elem: e,
                    trajectory_idx: data.len(),
                });
                data.push(Trajectory::Regular {
                    elem: e,
                    timesteps: vec![state.timestep],
                    offsets: vec![state.total_mem],
                    size,
                    color: e as i64,
                });
                state.total_mem += size;
                state.advance(1);
            }
            Some(idx) => {
                // Hit: free.
                let freed_traj_idx = live[idx].trajectory_idx;
                close_at_current_offset(&mut data[freed_traj_idx], state.timestep);

                live.remove(idx);

                // Shift animation for every block stacked above the freed one.
                if idx < live.len() {
                    for entry in &live[idx..] {
                        shift_down(&mut data[entry.trajectory_idx], state.timestep, size);
                    }
                    state.advance(3);
                }

                state.total_mem -= size;
                state.advance(1);
            }
        }

        state.note_max();
        progress.inc(1);
    }

    // 4.C.4 — Finalization: close every still-live trajectory.
    for entry in &live {
        close_at_current_offset(&mut data[entry.trajectory_idx], state.timestep);
    }

    let (summary, stats) = state.into_summary_trajectory();
    data.push(summary);

    progress.finish_and_clear();
    debug!(
        "simulation produced {} trajectories (incl. summary), max_size={}",
        data.len(),
        stats.max_size
    );

    SimulationOutput { data, stats }
}

fn close_at_current_offset(traj: &mut Trajectory, timestep: i64) {
    if let Trajectory::Regular {
        timesteps, offsets, ..
    } = traj
    {
        let last_offset = *offsets.last().expect("trajectory always has an offset");
        timesteps.push(timestep);
        offsets.push(last_offset);
    }
}

fn shift_down(traj: &mut Trajectory, timestep: i64, freed_size: i64) {
    if let Trajectory::Regular {
        timesteps, offsets, ..
    } = traj
    {
        let last_offset = *offsets.last().expect("trajectory always has an offset");
        timesteps.push(timestep);
        offsets.push(last_offset);
        timesteps.push(timestep + 3);
        offsets.push(last_offset - freed_size);
    }
}
