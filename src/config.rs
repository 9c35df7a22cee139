//! Configuration layer: assembles `file.*`, `read.*`, `write.*`, `memory.*`,
//! and `subscribers` into a validated [`PersistentArrayConfig`], via a
//! builder-with-defaults shape.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PersistentArrayError;
use crate::subscriber::ArraySubscriber;

/// How the backing file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Read-only.
    R,
    /// Read-write, no extra durability guarantee beyond the OS page cache.
    RW,
    /// Read-write; every release syncs file *data* (`fsync`-data equivalent).
    RWS,
    /// Read-write; every release syncs file data *and* metadata.
    RWD,
}

#[derive(Debug, Clone)]
pub struct FileConfig {
    pub path: PathBuf,
    pub mode: FileMode,
    pub buffer: usize,
    pub cached: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadConfig {
    pub chunked: bool,
    pub size: usize,
    pub force_reload: bool,
    pub break_on_loaded: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct WriteConfig {
    pub chunked: bool,
    pub size: usize,
    pub force_flush: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct MemoryConfig {
    pub size: usize,
}

/// Fully assembled, validated configuration for a [`crate::array::PersistentArray`].
#[derive(Clone)]
pub struct PersistentArrayConfig {
    pub file: FileConfig,
    pub read: ReadConfig,
    pub write: WriteConfig,
    pub memory: MemoryConfig,
    pub subscribers: Vec<Arc<dyn ArraySubscriber>>,
}

/// Builder for [`PersistentArrayConfig`]. Defaults: unbuffered single-record
/// linear reads, unchunked immediate writes, a 64-record window, a cached
/// read-write file handle with an 8 KiB buffer.
pub struct PersistentArrayConfigBuilder {
    file: FileConfig,
    read: ReadConfig,
    write: WriteConfig,
    memory: MemoryConfig,
    subscribers: Vec<Arc<dyn ArraySubscriber>>,
}

impl PersistentArrayConfigBuilder {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: FileConfig {
                path: path.as_ref().to_path_buf(),
                mode: FileMode::RW,
                buffer: 8192,
                cached: true,
            },
            read: ReadConfig {
                chunked: false,
                size: 1,
                force_reload: false,
                break_on_loaded: false,
            },
            write: WriteConfig {
                chunked: false,
                size: 1,
                force_flush: false,
            },
            memory: MemoryConfig { size: 64 },
            subscribers: Vec::new(),
        }
    }

    pub fn mode(mut self, mode: FileMode) -> Self {
        self.file.mode = mode;
        self
    }

    pub fn buffer(mut self, bytes: usize) -> Self {
        self.file.buffer = bytes;
        self
    }

    pub fn cached(mut self, cached: bool) -> Self {
        self.file.cached = cached;
        self
    }

    pub fn read_chunked(mut self, size: usize) -> Self {
        self.read.chunked = true;
        self.read.size = size.max(1);
        self
    }

    pub fn force_reload(mut self, force: bool) -> Self {
        self.read.force_reload = force;
        self
    }

    pub fn break_on_loaded(mut self, brk: bool) -> Self {
        self.read.break_on_loaded = brk;
        self
    }

    pub fn write_chunked(mut self, size: usize) -> Self {
        self.write.chunked = true;
        self.write.size = size.max(1);
        self
    }

    pub fn force_flush(mut self, force: bool) -> Self {
        self.write.force_flush = force;
        self
    }

    pub fn memory_size(mut self, size: usize) -> Self {
        self.memory.size = size.max(1);
        self
    }

    pub fn subscriber(mut self, subscriber: Arc<dyn ArraySubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validate `memory.size >= max(read.size, write.size)` and assemble the
    /// final configuration.
    pub fn build(self) -> Result<PersistentArrayConfig, PersistentArrayError> {
        if self.read.size > self.memory.size {
            return Err(PersistentArrayError::ReadChunkLimitExceeded {
                requested: self.read.size,
                memory_size: self.memory.size,
            });
        }
        if self.write.size > self.memory.size {
            return Err(PersistentArrayError::WriteChunkLimitExceeded {
                requested: self.write.size,
                memory_size: self.memory.size,
            });
        }
        Ok(PersistentArrayConfig {
            file: self.file,
            read: self.read,
            write: self.write,
            memory: self.memory,
            subscribers: self.subscribers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = PersistentArrayConfigBuilder::new("/tmp/x.prar").build().unwrap();
        assert!(cfg.memory.size >= cfg.read.size);
        assert!(cfg.memory.size >= cfg.write.size);
    }

    #[test]
    fn rejects_read_size_over_memory_size() {
        let err = PersistentArrayConfigBuilder::new("/tmp/x.prar")
            .memory_size(2)
            .read_chunked(3)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PersistentArrayError::ReadChunkLimitExceeded { .. }
        ));
    }

    #[test]
    fn rejects_write_size_over_memory_size() {
        let err = PersistentArrayConfigBuilder::new("/tmp/x.prar")
            .memory_size(2)
            .write_chunked(3)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PersistentArrayError::WriteChunkLimitExceeded { .. }
        ));
    }
}
