//! Project management: source discovery, sidecar configuration, and the
//! resolved-program facade.

mod loader;
mod program;

pub use loader::{LoadConfig, is_source_file};
pub use program::{Program, QueryError};
