//! Data layout: translates a record index into an absolute byte offset.
//!
//! Only the fixed-offset layout is implemented. The variable-offset layout
//! is declared in the format (`layout_flags.DD == 0`) but has no offset
//! table here; rather than stub it out with a function that silently
//! returns a wrong offset, [`crate::array::PersistentArray::open`] rejects
//! it outright with `UnsupportedLayout`.

use std::io::{self, Seek, SeekFrom};

/// Maps a record index to its absolute byte offset in the backing file.
pub trait RecordLayout {
    fn header_size(&self) -> usize;
    fn record_size(&self) -> usize;
    fn offset_of(&self, index: i64) -> u64;

    /// Seek `stream` to the start of record `index`.
    fn seek<S: Seek>(&self, stream: &mut S, index: i64) -> io::Result<u64> {
        stream.seek(SeekFrom::Start(self.offset_of(index)))
    }
}

/// `offset(i) = header_size + i * record_size`.
#[derive(Debug, Clone, Copy)]
pub struct FixedLayout {
    header_size: usize,
    record_size: usize,
}

impl FixedLayout {
    pub fn new(header_size: usize, record_size: usize) -> Self {
        Self {
            header_size,
            record_size,
        }
    }
}

impl RecordLayout for FixedLayout {
    fn header_size(&self) -> usize {
        self.header_size
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn offset_of(&self, index: i64) -> u64 {
        self.header_size as u64 + (index as u64) * (self.record_size as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_fixed_offsets() {
        let layout = FixedLayout::new(20, 5);
        assert_eq!(layout.offset_of(0), 20);
        assert_eq!(layout.offset_of(1), 25);
        assert_eq!(layout.offset_of(10), 70);
    }
}
