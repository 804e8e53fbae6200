//! On-disk formats: project record files and the index document.

pub mod reader;
pub mod writer;

pub use reader::{list_record_files, load_index, read_project_records, LoadedProject};
pub use writer::{to_pretty_json, write_json_atomic, CommitOutcome, PersistenceGate};
