//! Record codecs: fixed-width encode/decode of a value (or a null marker)
//! into exactly `record_size` bytes, plus a process-wide registry, seeded
//! with the built-in [`Int32Codec`]'s descriptor, consulted by
//! `PersistentArray::create`/`open` (src/array.rs) at construction time.
//!
//! # Identity rules
//! A record type is identified by a [`TypeDescriptor`] — a `(tag, record_size)`
//! pair. The tag is never renegotiated; two descriptors sharing a tag but
//! disagreeing on `record_size` are a registration conflict, not an override.
//!
//! Unlike the registry, the actual encode/decode behavior is never looked up
//! dynamically inside the hot path: [`crate::array::PersistentArray`] holds a
//! concrete `Box<dyn RecordCodec<T>>` supplied by the caller. Every
//! `create`/`open` call registers its codec's descriptor, so a second array
//! opened against a different tag that happens to disagree on `record_size`
//! with one already seen in this process is caught as a
//! [`RecordCodecError::DescriptorConflict`] rather than silently producing
//! two incompatible files under the same tag.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::RecordCodecError;

/// Marker byte written in place of a value when a record is the null marker.
pub const NULL_MARKER: u8 = 0x0F;
/// Marker byte written immediately before an encoded value.
pub const VALUE_MARKER: u8 = 0x00;

/// The type tag preregistered for the built-in 32-bit signed integer codec.
pub const INT32_TAG: u16 = 1;

/// A record type descriptor: a type tag paired with the fixed encoded size
/// (in bytes, including the one leading marker byte) of every record of
/// that type. `record_size` must be at least 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub tag: u16,
    pub record_size: usize,
}

impl TypeDescriptor {
    pub fn new(tag: u16, record_size: usize) -> Self {
        assert!(record_size >= 2, "record_size must be at least 2 bytes");
        Self { tag, record_size }
    }
}

/// A fixed-width codec for a concrete record type `T`.
///
/// Implementors own the entire wire representation: `encode` must always
/// produce exactly `descriptor().record_size` bytes, and `decode` must
/// accept exactly that many bytes back.
pub trait RecordCodec<T>: Send + Sync {
    fn descriptor(&self) -> TypeDescriptor;

    /// Encode a value, or `None` for the null marker, into exactly
    /// `record_size` bytes.
    fn encode(&self, value: Option<&T>) -> Vec<u8>;

    /// Decode exactly `record_size` bytes back into a value or the null
    /// marker. Fails with [`RecordCodecError::BadRecord`] if the marker byte
    /// is neither the null sentinel nor the value-present sentinel.
    fn decode(&self, bytes: &[u8]) -> Result<Option<T>, RecordCodecError>;
}

// ── Registry ─────────────────────────────────────────────────────────────────

static REGISTRY: OnceLock<Mutex<HashMap<u16, TypeDescriptor>>> = OnceLock::new();

/// The registry is seeded with the built-in [`Int32Codec`]'s descriptor on
/// first access, so it is genuinely preregistered rather than merely
/// registrable — `PersistentArray::open`/`create` (src/array.rs) consult it
/// at construction time to confirm a caller-supplied codec's descriptor
/// agrees with whatever was already registered for that tag.
fn registry() -> &'static Mutex<HashMap<u16, TypeDescriptor>> {
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert(INT32_TAG, TypeDescriptor::new(INT32_TAG, 5));
        Mutex::new(map)
    })
}

/// Register a type descriptor. A second registration under the same tag
/// is a no-op if `record_size` agrees, and a [`RecordCodecError::DescriptorConflict`]
/// otherwise.
pub fn register_descriptor(descriptor: TypeDescriptor) -> Result<(), RecordCodecError> {
    let mut map = registry().lock().unwrap();
    match map.get(&descriptor.tag) {
        Some(existing) if existing.record_size != descriptor.record_size => {
            Err(RecordCodecError::DescriptorConflict {
                tag: descriptor.tag,
                existing_size: existing.record_size,
                new_size: descriptor.record_size,
            })
        }
        Some(_) => Ok(()),
        None => {
            map.insert(descriptor.tag, descriptor);
            Ok(())
        }
    }
}

/// Look up a previously registered descriptor by tag.
pub fn lookup_descriptor(tag: u16) -> Option<TypeDescriptor> {
    registry().lock().unwrap().get(&tag).copied()
}

// ── Marked-integer wire format ───────────────────────────────────────────────
//
// Shared by the built-in Int32Codec and by the array header itself: `length`
// and `record_size` in the on-disk header use this exact 5-byte encoding.

/// Encode an optional big-endian `i32` with its leading null/value marker
/// byte, producing exactly 5 bytes.
pub fn encode_marked_i32(value: Option<i32>) -> [u8; 5] {
    let mut out = [0u8; 5];
    match value {
        None => out[0] = NULL_MARKER,
        Some(v) => {
            out[0] = VALUE_MARKER;
            let mut body = &mut out[1..5];
            body.write_i32::<BigEndian>(v).expect("fixed 4-byte buffer");
        }
    }
    out
}

/// Decode 5 bytes produced by [`encode_marked_i32`].
pub fn decode_marked_i32(bytes: &[u8]) -> Result<Option<i32>, RecordCodecError> {
    if bytes.len() < 5 {
        return Err(RecordCodecError::Truncated {
            expected: 5,
            actual: bytes.len(),
        });
    }
    match bytes[0] {
        NULL_MARKER => Ok(None),
        VALUE_MARKER => {
            let mut body = &bytes[1..5];
            Ok(Some(body.read_i32::<BigEndian>().expect("exactly 4 bytes")))
        }
        other => Err(RecordCodecError::BadRecord { marker: other }),
    }
}

/// The preregistered built-in codec: a 32-bit signed integer, big-endian,
/// with a one-byte null marker.
pub struct Int32Codec;

impl RecordCodec<i32> for Int32Codec {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::new(INT32_TAG, 5)
    }

    fn encode(&self, value: Option<&i32>) -> Vec<u8> {
        encode_marked_i32(value.copied()).to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<i32>, RecordCodecError> {
        decode_marked_i32(bytes)
    }
}
