//! Component D — Call-Stack Formatter.

use crate::model::Frame;

/// Render `frames` as the canonical multi-line call-stack text: each line
/// is `(i) {filename}:{line}:{name}` with `i` the zero-based frame index,
/// joined with `\n`. Empty input yields an empty string (`spec.md` §4.D).
pub fn format_callstack(frames: &[Frame]) -> String {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| format!("({i}) {}:{}:{}", frame.filename, frame.line, frame.name))
        .collect::<Vec<_>>()
        .join("\n")
}
