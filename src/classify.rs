//! Component B — Event Classifier.
//!
//! Partitions a device's event trace into persistent `Element`s and the
//! `Action` sequence that drives the simulator (`spec.md` §4.B). A single
//! forward pass, preserving input order.

use std::collections::HashMap;

use indicatif::ProgressBar;
use tracing::debug;

use crate::model::{Element, ElementKind, Event};

const FREE_ACTIONS: [&str; 2] = ["free", "free_completed"];

/// The result of classification: the dense element arena, and the
/// sequence of element indices the simulator must replay in order.
pub struct Classified {
    pub elements: Vec<Element>,
    pub actions: Vec<usize>,
}

/// Classify `events` in order. Unknown action kinds are silently skipped
/// (`spec.md` §4.B, "Any other action kind: ignored").
pub fn classify(events: &[Event], progress: &ProgressBar) -> Classified {
    let mut live_addr: HashMap<i64, usize> = HashMap::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut actions: Vec<usize> = Vec::with_capacity(events.len());

    progress.set_length(events.len() as u64);

    for event in events {
        if event.action == "alloc" {
            elements.push(Element::from_event(event, ElementKind::Allocation));
            let i = elements.len() - 1;
            live_addr.insert(event.addr, i);
            actions.push(i);
        } else if FREE_ACTIONS.contains(&event.action.as_str()) {
            if let Some(i) = live_addr.remove(&event.addr) {
                actions.push(i);
            } else {
                elements.push(Element::from_event(event, ElementKind::OrphanFree));
                let i = elements.len() - 1;
                actions.push(i);
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    debug!(
        "classified {} events into {} elements, {} actions",
        events.len(),
        elements.len(),
        actions.len()
    );

    Classified { elements, actions }
}

/// The subset of `elements` that are orphan-free placeholders, in the
/// order they were appended — the order `simulate::run` must process them
/// in reverse (`spec.md` §4.C.2).
pub fn initially_allocated(elements: &[Element]) -> Vec<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == ElementKind::OrphanFree)
        .map(|(i, _)| i)
        .collect()
}
