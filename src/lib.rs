//! docmeta library
//!
//! Orchestrates the external exiftool engine to read and write a custom
//! JSON metadata payload embedded in PDF documents. The pipeline is
//! validation (guard) -> engine invocation (engine) -> bidirectional
//! encoding (codec), composed by the operations in `ops`.

pub mod cli;
pub mod codec;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod guard;
pub mod ops;

// Re-export main types for convenience
pub use codec::{decode_engine_output, encode_engine_input, load, render, DecodedTag, Format};
pub use dedup::{find_duplicates, human_size, DuplicateGroup};
pub use engine::{find_binary, Engine, EngineOutput};
pub use error::{MetaError, Result};
pub use ops::{
    read, read_batch, read_single, write_single, BatchOutcome, MetadataSource, ReadOutcome,
};
