//! The persistent array itself: the assembly of the header, layout, file
//! handle cache, chunk queue, in-memory window, and subscriber bus into the
//! public `get`/`set`/`fill`/`flush`/`close`/`resize_*` surface.
//!
//! This is the only component with real engineering depth in the crate; see
//! the module docs on [`crate::header`], [`crate::chunk_queue`], and
//! [`crate::window`] for the on-disk format and cache primitives this type
//! composes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::RecordCodec;
use crate::config::PersistentArrayConfig;
use crate::error::PersistentArrayError;
use crate::file_cache::FileHandleCache;
use crate::header::{Header, CURRENT_CRITICAL, CURRENT_MAJOR, HEADER_SIZE, LAYOUT_DD_FIXED};
use crate::layout::{FixedLayout, RecordLayout};
use crate::chunk_queue::WriteChunkQueue;
use crate::subscriber::{ArrayEvent, ChunkKind};
use crate::window::Window;

/// A file-backed, windowed, chunk-writing array of fixed-size records of
/// type `T`.
pub struct PersistentArray<T> {
    codec: Box<dyn RecordCodec<T>>,
    layout: FixedLayout,
    file_cache: FileHandleCache,
    window: Window<T>,
    write_queue: WriteChunkQueue,
    length: i64,
    config: PersistentArrayConfig,
}

impl<T: Clone> PersistentArray<T> {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Create a brand-new backing file of `length` records, every one
    /// initialized to the codec's null marker.
    pub fn create(
        length: i64,
        codec: Box<dyn RecordCodec<T>>,
        config: PersistentArrayConfig,
    ) -> Result<Self, PersistentArrayError> {
        Self::check_memory_bounds(&config)?;

        let descriptor = codec.descriptor();
        crate::codec::register_descriptor(descriptor)?;
        let header = Header::new(length as i32, descriptor.record_size as i32);
        let layout = FixedLayout::new(HEADER_SIZE, descriptor.record_size);

        let mut file_cache = FileHandleCache::new(
            config.file.path.clone(),
            config.file.mode,
            config.file.cached,
            true,
        )?;

        {
            let mut file = file_cache.acquire()?;
            header.write(&mut file)?;

            let null_record = codec.encode(None);
            let mut writer = BufWriter::with_capacity(config.file.buffer, &mut file);
            for _ in 0..length {
                writer.write_all(&null_record)?;
            }
            writer.flush()?;
            drop(writer);
            file_cache.release(file)?;
        }

        let window_capacity = (length.max(0) as usize).min(config.memory.size).max(1);
        let write_capacity = config.write.size.max(1);

        let array = Self {
            codec,
            layout,
            file_cache,
            window: Window::new(window_capacity),
            write_queue: WriteChunkQueue::new(write_capacity),
            length,
            config,
        };
        array.notify(ArrayEvent::FileCreated)?;
        Ok(array)
    }

    /// Open an existing backing file, validating the header version and
    /// layout, then preload up to `min(memory.size, preload_indices.len())`
    /// indices into the window.
    pub fn open(
        codec: Box<dyn RecordCodec<T>>,
        config: PersistentArrayConfig,
        preload_indices: &[i64],
    ) -> Result<Self, PersistentArrayError> {
        Self::check_memory_bounds(&config)?;

        let mut file_cache = FileHandleCache::new(
            config.file.path.clone(),
            config.file.mode,
            config.file.cached,
            false,
        )?;

        let header = {
            let mut file = file_cache.acquire()?;
            let header = Header::read(&mut file)?;
            file_cache.release(file)?;
            header
        };

        if header.critical != CURRENT_CRITICAL || header.major > CURRENT_MAJOR {
            return Err(PersistentArrayError::IncompatibleVersion {
                file_critical: header.critical,
                file_major: header.major,
                this_critical: CURRENT_CRITICAL,
                this_major: CURRENT_MAJOR,
            });
        }

        let layout_dd = header.record_layout();
        if layout_dd != LAYOUT_DD_FIXED {
            return Err(PersistentArrayError::UnsupportedLayout(layout_dd));
        }

        let length = header.length as i64;
        let record_size = header.record_size as usize;
        let descriptor = codec.descriptor();
        // Consult the registry: a tag already registered under a different
        // record_size than this codec's own is a descriptor conflict the
        // registry is specifically for catching, independent of what this
        // particular file's header happens to say.
        crate::codec::register_descriptor(descriptor)?;
        if descriptor.record_size != record_size {
            return Err(PersistentArrayError::BadHeader(format!(
                "codec record_size {} does not match header record_size {}",
                descriptor.record_size, record_size
            )));
        }

        let layout = FixedLayout::new(HEADER_SIZE, record_size);
        let window_capacity = (length.max(0) as usize).min(config.memory.size).max(1);
        let write_capacity = config.write.size.max(1);

        let mut array = Self {
            codec,
            layout,
            file_cache,
            window: Window::new(window_capacity),
            write_queue: WriteChunkQueue::new(write_capacity),
            length,
            config,
        };

        let preload_count = preload_indices.len().min(array.window.capacity());
        for &index in preload_indices.iter().take(preload_count) {
            array.get(index)?;
        }

        Ok(array)
    }

    fn check_memory_bounds(config: &PersistentArrayConfig) -> Result<(), PersistentArrayError> {
        if config.read.size > config.memory.size {
            return Err(PersistentArrayError::ReadChunkLimitExceeded {
                requested: config.read.size,
                memory_size: config.memory.size,
            });
        }
        if config.write.size > config.memory.size {
            return Err(PersistentArrayError::WriteChunkLimitExceeded {
                requested: config.write.size,
                memory_size: config.memory.size,
            });
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> i64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn check_index(&self, index: i64) -> Result<(), PersistentArrayError> {
        if index < 0 || index >= self.length {
            return Err(PersistentArrayError::IndexOutOfRange {
                index,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Fan out `event` to every subscriber in registration order. A
    /// subscriber returning `Err` aborts the surrounding operation
    /// immediately — later subscribers in the list are not invoked.
    fn notify(&self, event: ArrayEvent) -> Result<(), PersistentArrayError> {
        for subscriber in &self.config.subscribers {
            subscriber.on_event(&event)?;
        }
        Ok(())
    }

    // ── Read path ─────────────────────────────────────────────────────────────

    /// Return the current value (possibly the null marker) at `index`,
    /// loading it from disk on demand.
    pub fn get(&mut self, index: i64) -> Result<Option<T>, PersistentArrayError> {
        self.check_index(index)?;

        if self.config.read.force_reload {
            // Force a genuine reload even if this slot happens to already be
            // resident: evict first so the shared loader below can't treat
            // it as "already cached, skip".
            self.window.evict(index);
            self.load(index)?;
        } else if !self.window.contains(index) {
            self.notify(ArrayEvent::CacheMiss { index })?;
            self.load(index)?;
        }

        Ok(self.window.get(index).cloned())
    }

    fn load(&mut self, index: i64) -> Result<(), PersistentArrayError> {
        let size = if self.config.read.chunked {
            self.config.read.size.max(1)
        } else {
            1
        };
        self.deserialize(index, size)
    }

    /// Load up to `size` contiguous records starting at `index`, skipping
    /// (but noting) any already-resident offsets encountered along the way.
    fn deserialize(&mut self, index: i64, size: usize) -> Result<(), PersistentArrayError> {
        let end = (index + size as i64).min(self.length);
        if index >= end {
            return Ok(());
        }

        let mut file = self.file_cache.acquire()?;
        self.layout.seek(&mut file, index)?;
        let mut reader = BufReader::with_capacity(self.config.file.buffer, &mut file);

        let mut should_seek = false;
        let mut buf = vec![0u8; self.layout.record_size()];
        let mut offset = index;

        while offset < end {
            if self.window.contains(offset) {
                should_seek = true;
                if self.config.read.break_on_loaded {
                    break;
                }
                offset += 1;
                continue;
            }

            if should_seek {
                let target = HEADER_SIZE as u64 + (offset as u64) * (self.layout.record_size() as u64);
                reader.seek(SeekFrom::Start(target))?;
                should_seek = false;
            }

            reader.read_exact(&mut buf)?;
            let value = self.codec.decode(&buf)?;
            self.window.associate(offset, value);
            self.notify(ArrayEvent::RecordDeserialized { index: offset })?;
            offset += 1;
        }

        drop(reader);
        self.file_cache.release(file)?;
        self.notify(ArrayEvent::ChunkDeserialized)?;
        Ok(())
    }

    // ── Write path ────────────────────────────────────────────────────────────

    /// Store `v` at `index`, visible to subsequent `get(index)`.
    pub fn set(&mut self, index: i64, v: T) -> Result<(), PersistentArrayError> {
        self.set_opt(index, Some(v))
    }

    /// Store the null marker at `index`.
    pub fn set_null(&mut self, index: i64) -> Result<(), PersistentArrayError> {
        self.set_opt(index, None)
    }

    fn set_opt(&mut self, index: i64, v: Option<T>) -> Result<(), PersistentArrayError> {
        self.check_index(index)?;

        let prior = self.window.owner_at(index);
        if prior >= 0 && prior != index && self.write_queue.contains(prior) {
            if self.config.write.force_flush {
                self.flush()?;
            } else {
                self.serialize_one(prior)?;
                self.write_queue.remove(prior);
            }
            self.notify(ArrayEvent::WriteCollision {
                prior,
                incoming: index,
            })?;
        }

        self.window.associate(index, v);

        if self.config.write.chunked {
            if self.write_queue.add(index) {
                self.flush()?;
            }
        } else {
            self.serialize_one(index)?;
        }

        Ok(())
    }

    fn serialize_one(&mut self, index: i64) -> Result<(), PersistentArrayError> {
        let mut file = self.file_cache.acquire()?;
        self.layout.seek(&mut file, index)?;
        let value = self.window.get(index).cloned();
        let bytes = self.codec.encode(value.as_ref());
        file.write_all(&bytes)?;
        self.file_cache.release(file)?;
        self.notify(ArrayEvent::RecordSerialized { index })?;
        Ok(())
    }

    /// Flush all queued dirty records to disk in ascending-index order,
    /// seeking only between non-contiguous runs. No-op if writes aren't
    /// chunked or nothing is queued.
    pub fn flush(&mut self) -> Result<(), PersistentArrayError> {
        if !self.config.write.chunked || self.write_queue.is_empty() {
            return Ok(());
        }

        let indices: Vec<i64> = self.write_queue.iter().collect();
        let record_size = self.layout.record_size() as u64;

        let mut file = self.file_cache.acquire()?;
        self.layout.seek(&mut file, indices[0])?;
        let mut writer = BufWriter::with_capacity(self.config.file.buffer, &mut file);

        let mut prev = indices[0];
        for (n, &cur) in indices.iter().enumerate() {
            if n > 0 && cur != prev + 1 {
                let target = HEADER_SIZE as u64 + (cur as u64) * record_size;
                writer.seek(SeekFrom::Start(target))?;
            }
            let value = self.window.get(cur).cloned();
            let bytes = self.codec.encode(value.as_ref());
            writer.write_all(&bytes)?;
            self.notify(ArrayEvent::RecordSerialized { index: cur })?;
            prev = cur;
        }

        writer.flush()?;
        drop(writer);
        self.file_cache.release(file)?;
        self.write_queue.clear();
        self.notify(ArrayEvent::ChunkSerialized)?;
        Ok(())
    }

    /// Set every index to `v`, temporarily widening the write-chunk capacity
    /// to `config.write.size` so the bulk fill coalesces maximally.
    pub fn fill(&mut self, v: T) -> Result<(), PersistentArrayError> {
        let prior_capacity = self.write_queue.capacity();
        self.write_queue.set_capacity(self.config.write.size.max(1));

        for index in 0..self.length {
            self.set(index, v.clone())?;
        }

        self.write_queue.set_capacity(prior_capacity);
        Ok(())
    }

    // ── Resizing ──────────────────────────────────────────────────────────────

    pub fn resize_read_chunk(&mut self, n: usize) -> Result<(), PersistentArrayError> {
        if n > self.config.memory.size {
            return Err(PersistentArrayError::ReadChunkLimitExceeded {
                requested: n,
                memory_size: self.config.memory.size,
            });
        }
        let prior = self.config.read.size;
        self.config.read.size = n;
        self.notify(ArrayEvent::ChunkResized {
            kind: ChunkKind::Read,
            prior,
            next: n,
        })?;
        Ok(())
    }

    pub fn resize_write_chunk(&mut self, n: usize) -> Result<(), PersistentArrayError> {
        if n > self.config.memory.size {
            return Err(PersistentArrayError::WriteChunkLimitExceeded {
                requested: n,
                memory_size: self.config.memory.size,
            });
        }
        self.flush()?;
        let prior = self.config.write.size;
        self.config.write.size = n;
        self.write_queue.set_capacity(n.max(1));
        self.notify(ArrayEvent::ChunkResized {
            kind: ChunkKind::Write,
            prior,
            next: n,
        })?;
        Ok(())
    }

    pub fn resize_memory_chunk(&mut self, n: usize) -> Result<(), PersistentArrayError> {
        if n < self.config.read.size {
            return Err(PersistentArrayError::ReadChunkLimitExceeded {
                requested: self.config.read.size,
                memory_size: n,
            });
        }
        if n < self.config.write.size {
            return Err(PersistentArrayError::WriteChunkLimitExceeded {
                requested: self.config.write.size,
                memory_size: n,
            });
        }
        self.flush()?;
        let prior = self.config.memory.size;
        self.config.memory.size = n;
        self.window.resize(n);
        self.notify(ArrayEvent::ChunkResized {
            kind: ChunkKind::Memory,
            prior,
            next: n,
        })?;
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Flush then release the file handle cache. Idempotent; always attempts
    /// both steps and surfaces the first error.
    pub fn close(&mut self) -> Result<(), PersistentArrayError> {
        let flush_result = self.flush();
        let shutdown_result = self.file_cache.shutdown().map_err(PersistentArrayError::from);
        flush_result.and(shutdown_result)
    }

    /// Close, delete the backing file, and reset the in-memory state.
    pub fn clear(&mut self) -> Result<(), PersistentArrayError> {
        self.close()?;
        if self.config.file.path.exists() {
            std::fs::remove_file(&self.config.file.path)?;
        }
        self.window = Window::new(self.window.capacity());
        self.write_queue.clear();
        Ok(())
    }

    /// Copy `n` elements from `src[src_pos..]` to `dst[dst_pos..]` as `n`
    /// paired `get`/`set` calls; no file-level optimization.
    pub fn arraycopy(
        src: &mut PersistentArray<T>,
        src_pos: i64,
        dst: &mut PersistentArray<T>,
        dst_pos: i64,
        n: i64,
    ) -> Result<(), PersistentArrayError> {
        for k in 0..n {
            let value = src.get(src_pos + k)?;
            dst.set_opt(dst_pos + k, value)?;
        }
        Ok(())
    }
}

/// Raw header inspection without constructing a full array or loading any
/// record — used by the `info` CLI subcommand.
pub fn peek_header(path: impl AsRef<Path>) -> Result<Header, PersistentArrayError> {
    let mut file = File::open(path)?;
    Header::read(&mut file)
}
