//! Error types for the persistent array and its collaborators.

use std::io;
use thiserror::Error;

/// Errors returned while encoding or decoding a single record.
#[derive(Error, Debug)]
pub enum RecordCodecError {
    #[error("record buffer too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("bad record: unrecognised marker byte {marker:#04x}")]
    BadRecord { marker: u8 },
    #[error("descriptor conflict for tag {tag}: already registered with record_size {existing_size}, got {new_size}")]
    DescriptorConflict {
        tag: u16,
        existing_size: usize,
        new_size: usize,
    },
}

/// Top-level error type surfaced by every [`crate::array::PersistentArray`] operation.
#[derive(Error, Debug)]
pub enum PersistentArrayError {
    #[error("index {index} out of range [0, {length})")]
    IndexOutOfRange { index: i64, length: i64 },

    #[error(
        "incompatible version: file is (critical={file_critical}, major={file_major}), \
         this build supports critical={this_critical}, major>={this_major}"
    )]
    IncompatibleVersion {
        file_critical: u8,
        file_major: u8,
        this_critical: u8,
        this_major: u8,
    },

    #[error("bad header: {0}")]
    BadHeader(String),

    #[error("bad record: {0}")]
    BadRecord(#[from] RecordCodecError),

    #[error("read chunk size {requested} exceeds in-memory window size {memory_size}")]
    ReadChunkLimitExceeded { requested: usize, memory_size: usize },

    #[error("write chunk size {requested} exceeds in-memory window size {memory_size}")]
    WriteChunkLimitExceeded { requested: usize, memory_size: usize },

    #[error("unsupported record layout (layout_flags.DD = {0})")]
    UnsupportedLayout(u8),

    #[error("I/O failure: {0}")]
    IOFailure(#[from] io::Error),
}
