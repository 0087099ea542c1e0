// Checkpoint state for incremental exports

pub mod checkpoint;
pub mod store;

pub use checkpoint::{format_timestamp, parse_timestamp, Checkpoint, TIMESTAMP_FORMAT};
pub use store::{CheckpointStore, CHECKPOINT_FILE_NAME};
