//! # parray — a persistent fixed-record array
//!
//! Format guarantees (frozen in v1):
//! - The header is 20 bytes, bit-exact: magic, (critical, major, minor),
//!   layout_flags, marked-big-endian length and record_size
//! - Record addressing is direct: `offset(i) = header_size + i * record_size`,
//!   never an index lookup
//! - Only the fixed-offset record layout (`layout_flags.DD == 1`) is
//!   implemented; the variable-offset layout is reserved and rejected
//! - A record is a one-byte null/value marker followed by its encoded
//!   payload; decoding any other marker byte is an error, not a fallback
//! - The in-memory window is ring-shaped: slot `i mod W`, at most one
//!   resident index per slot
//! - Dirty writes coalesce into a bounded, gap-aware ordered flush queue
//!
//! See `array` for the core type, `config` for how its file/read/write/
//! memory knobs are assembled, and `subscriber` for its event bus.

pub mod array;
pub mod chunk_queue;
pub mod codec;
pub mod config;
pub mod error;
pub mod file_cache;
pub mod header;
pub mod layout;
pub mod subscriber;
pub mod window;

pub use array::{peek_header, PersistentArray};
pub use codec::{
    lookup_descriptor, register_descriptor, Int32Codec, RecordCodec, TypeDescriptor, INT32_TAG,
};
pub use config::{
    FileConfig, FileMode, MemoryConfig, PersistentArrayConfig, PersistentArrayConfigBuilder,
    ReadConfig, WriteConfig,
};
pub use error::{PersistentArrayError, RecordCodecError};
pub use header::{Header, CURRENT_CRITICAL, CURRENT_MAJOR, CURRENT_MINOR, HEADER_SIZE, MAGIC};
pub use subscriber::{ArrayEvent, ArraySubscriber, ChunkKind, TracingSubscriber};
