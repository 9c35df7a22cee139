//! File handle cache: owns the random-access backing file.
//!
//! In **cached** mode the handle is acquired once and handed back and forth
//! between the cache and the caller across operations (scoped release is a
//! no-op beyond an optional sync). In **uncached** mode every `acquire`
//! opens a fresh handle and every `release` closes it.
//!
//! Rust's ownership rules mean "keep the handle open but let the caller
//! borrow it" can't be expressed as a bare `&mut File` across non-lexical
//! operation boundaries without a cell; instead `acquire`/`release` move the
//! `File` in and out of the cache's `Option`, which gives the same observable
//! contract (persistent in cached mode, single-use in uncached mode) without
//! interior mutability.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;

use crate::config::FileMode;

pub struct FileHandleCache {
    path: PathBuf,
    mode: FileMode,
    cached: bool,
    handle: Option<File>,
}

impl FileHandleCache {
    /// Open (or, for `create`, truncate-create) the backing file and, if
    /// `cached` is set, keep the handle open immediately.
    pub fn new(path: PathBuf, mode: FileMode, cached: bool, create: bool) -> io::Result<Self> {
        let mut cache = Self {
            path,
            mode,
            cached,
            handle: None,
        };
        if cached {
            cache.handle = Some(cache.open(create)?);
        }
        Ok(cache)
    }

    fn open(&self, create: bool) -> io::Result<File> {
        let mut opts = OpenOptions::new();
        match self.mode {
            FileMode::R => {
                opts.read(true);
            }
            FileMode::RW | FileMode::RWS | FileMode::RWD => {
                opts.read(true).write(true);
                if create {
                    opts.create(true).truncate(true);
                }
            }
        }
        opts.open(&self.path)
    }

    /// Obtain the file handle for one operation. In cached mode this takes
    /// the persistent handle out (it must be returned via [`Self::release`]);
    /// in uncached mode a fresh handle is opened.
    pub fn acquire(&mut self) -> io::Result<File> {
        if self.cached {
            match self.handle.take() {
                Some(f) => Ok(f),
                None => self.open(false),
            }
        } else {
            self.open(false)
        }
    }

    /// Return a handle obtained from [`Self::acquire`]. In cached mode the
    /// handle is retained for the next acquisition; in uncached mode it is
    /// dropped (closed) here, after an optional durability sync.
    pub fn release(&mut self, mut file: File) -> io::Result<()> {
        match self.mode {
            FileMode::RWS => file.sync_data()?,
            FileMode::RWD => file.sync_all()?,
            FileMode::R | FileMode::RW => {}
        }
        if self.cached {
            self.handle = Some(file);
        }
        Ok(())
    }

    /// Idempotent: closes the persistent handle, if any, after an optional
    /// durability sync.
    pub fn shutdown(&mut self) -> io::Result<()> {
        if let Some(mut f) = self.handle.take() {
            match self.mode {
                FileMode::RWS => f.sync_data()?,
                FileMode::RWD => f.sync_all()?,
                FileMode::R | FileMode::RW => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn cached_mode_retains_handle_across_acquire_release() {
        let tmp = NamedTempFile::new().unwrap();
        let mut cache =
            FileHandleCache::new(tmp.path().to_path_buf(), FileMode::RW, true, true).unwrap();
        let f = cache.acquire().unwrap();
        cache.release(f).unwrap();
        // A second acquire must succeed by reusing the retained handle.
        let f2 = cache.acquire().unwrap();
        cache.release(f2).unwrap();
        cache.shutdown().unwrap();
    }

    #[test]
    fn uncached_mode_reopens_each_time() {
        let tmp = NamedTempFile::new().unwrap();
        let mut cache =
            FileHandleCache::new(tmp.path().to_path_buf(), FileMode::RW, false, true).unwrap();
        let f = cache.acquire().unwrap();
        cache.release(f).unwrap();
        let f2 = cache.acquire().unwrap();
        cache.release(f2).unwrap();
        cache.shutdown().unwrap();
    }

    #[test]
    fn shutdown_is_idempotent() {
        let tmp = NamedTempFile::new().unwrap();
        let mut cache =
            FileHandleCache::new(tmp.path().to_path_buf(), FileMode::RW, true, true).unwrap();
        cache.shutdown().unwrap();
        cache.shutdown().unwrap();
    }
}
