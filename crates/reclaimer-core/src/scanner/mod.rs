//! Reference file indexer. Lives outside the engine: the engine only consumes the records
//! this produces.

pub mod walk;

pub use walk::{index_paths, record_for};
