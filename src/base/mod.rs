//! Foundation types: source positions, spans, line indexing.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::{Position, Span};
