//! Array header — format anchor at offset 0.
//!
//! # On-disk layout (20 bytes, bit-exact, frozen)
//!
//! ```text
//! Offset  Size  Field
//!    0      6   magic          = DE CA DA FA CA DA  (not a number — raw bytes)
//!    6      1   critical       version, must match exactly
//!    7      1   major          version, file's must be <= this build's
//!    8      1   minor          version, informational only
//!    9      1   layout_flags   AA BB CC DD, 2 bits each (see below)
//!   10      5   length         marked big-endian i32 (record count)
//!   15      5   record_size    marked big-endian i32 (bytes per record)
//!   20     ...  record payloads, `length * record_size` bytes
//! ```
//!
//! `length` and `record_size` use the exact same marker-byte-plus-big-endian-i32
//! encoding as the built-in [`crate::codec::Int32Codec`] — the header is, in
//! effect, two records of that type glued to the front of the file.
//!
//! `layout_flags` bit assignment, MSB to LSB: `AA` (reserved), `BB` (ordering
//! mode: 0 sequential, 1 search-optimized-reserved), `CC` (chunking mode: 0
//! linear, 1 chunked, 2/3 reserved), `DD` (record layout: 0 variable
//! reserved/unimplemented, 1 fixed). Only `DD` is ever set by this
//! implementation; chunking/ordering modes are a runtime [`crate::config`]
//! concern, not a persisted one.

use std::io::{self, Read, Write};

use crate::codec::{decode_marked_i32, encode_marked_i32};
use crate::error::PersistentArrayError;

/// Canonical magic bytes ("DECADAFACADA"). The mirror-image spelling found in
/// some historical sources is not self-consistent and is treated as a bug,
/// never emitted or accepted here.
pub const MAGIC: [u8; 6] = [0xDE, 0xCA, 0xDA, 0xFA, 0xCA, 0xDA];

pub const CURRENT_CRITICAL: u8 = 1;
pub const CURRENT_MAJOR: u8 = 1;
pub const CURRENT_MINOR: u8 = 0;

/// Total byte length of the header: 6 (magic) + 4 (version) + 5 + 5 (length, record_size).
pub const HEADER_SIZE: usize = 20;

/// `layout_flags.DD` value for the fixed-offset layout (the only one implemented).
pub const LAYOUT_DD_FIXED: u8 = 0b01;
/// `layout_flags.DD` value reserved for the variable-offset layout.
pub const LAYOUT_DD_VARIABLE: u8 = 0b00;

#[derive(Debug, Clone)]
pub struct Header {
    pub critical: u8,
    pub major: u8,
    pub minor: u8,
    pub layout_flags: u8,
    pub length: i32,
    pub record_size: i32,
}

impl Header {
    /// Build the header written by `create()`: fixed layout, linear chunking,
    /// sequential ordering — the only combination this implementation emits.
    pub fn new(length: i32, record_size: i32) -> Self {
        Self {
            critical: CURRENT_CRITICAL,
            major: CURRENT_MAJOR,
            minor: CURRENT_MINOR,
            layout_flags: LAYOUT_DD_FIXED,
            length,
            record_size,
        }
    }

    /// `layout_flags.DD`, the persisted record-layout selector.
    pub fn record_layout(&self) -> u8 {
        self.layout_flags & 0b11
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(&MAGIC);
        buf.push(self.critical);
        buf.push(self.major);
        buf.push(self.minor);
        buf.push(self.layout_flags);
        buf.extend_from_slice(&encode_marked_i32(Some(self.length)));
        buf.extend_from_slice(&encode_marked_i32(Some(self.record_size)));
        debug_assert_eq!(buf.len(), HEADER_SIZE);
        w.write_all(&buf)
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, PersistentArrayError> {
        let mut buf = [0u8; HEADER_SIZE];
        if let Err(e) = r.read_exact(&mut buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(PersistentArrayError::BadHeader(format!(
                    "truncated header: expected {HEADER_SIZE} bytes"
                )));
            }
            return Err(PersistentArrayError::IOFailure(e));
        }

        if buf[0..6] != MAGIC {
            return Err(PersistentArrayError::BadHeader(
                "magic mismatch — not a persistent array file".into(),
            ));
        }

        let critical = buf[6];
        let major = buf[7];
        let minor = buf[8];
        let layout_flags = buf[9];

        let length = decode_marked_i32(&buf[10..15])
            .map_err(|e| PersistentArrayError::BadHeader(e.to_string()))?
            .ok_or_else(|| PersistentArrayError::BadHeader("length field is null".into()))?;
        let record_size = decode_marked_i32(&buf[15..20])
            .map_err(|e| PersistentArrayError::BadHeader(e.to_string()))?
            .ok_or_else(|| PersistentArrayError::BadHeader("record_size field is null".into()))?;

        Ok(Self {
            critical,
            major,
            minor,
            layout_flags,
            length,
            record_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_through_bytes() {
        let header = Header::new(10, 5);
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[0..6], &MAGIC);

        let mut cursor = Cursor::new(buf);
        let read_back = Header::read(&mut cursor).unwrap();
        assert_eq!(read_back.length, 10);
        assert_eq!(read_back.record_size, 5);
        assert_eq!(read_back.record_layout(), LAYOUT_DD_FIXED);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0] = 0x00;
        let mut cursor = Cursor::new(buf);
        assert!(Header::read(&mut cursor).is_err());
    }

    #[test]
    fn truncated_header_is_bad_header_not_io_failure() {
        let mut cursor = Cursor::new(vec![0u8; HEADER_SIZE - 3]);
        let err = Header::read(&mut cursor).unwrap_err();
        assert!(matches!(err, PersistentArrayError::BadHeader(_)), "{err:?}");
    }
}
