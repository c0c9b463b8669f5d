//! Progress-tracking reader for upload bodies.
//!
//! [`ProgressReader`] wraps a seekable byte source and reports the observed
//! position to a callback after every read. Chunk bodies are built from
//! [`SectionReader`] views over one shared reader, so several views may read
//! through the same source while a single progress state is kept.
//!
//! ## Progress semantics
//!
//! Two read paths update progress differently:
//!
//! - [`ProgressReader::read`] accumulates: the counter grows by the number of
//!   bytes read.
//! - [`ProgressReader::read_at`] sets the counter to `offset + bytes_read`,
//!   the absolute position reached.
//!
//! Progress is therefore "last absolute position observed" for section
//! views. Overlapping or out-of-order reads can move it backwards or make it
//! jump; in-order chunk uploads keep it non-decreasing.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;

/// Callback invoked with `(observed, total)` after every read.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Any seekable byte source that can move between threads.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Snapshot of reader progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// Bytes observed so far
    pub read: u64,
    /// Size ceiling (total source size)
    pub size: u64,
}

impl ProgressState {
    /// Progress as a percentage in `0..=100`.
    #[must_use]
    pub fn percent(&self) -> u8 {
        crate::file::percent(self.read, self.size)
    }
}

/// A byte source that reports cumulative consumption after every read.
pub struct ProgressReader {
    source: Mutex<Box<dyn ReadSeek>>,
    state: Mutex<ProgressState>,
    callback: ProgressCallback,
}

impl ProgressReader {
    /// Wrap a seekable source of `size` bytes.
    pub fn new<R, F>(source: R, size: u64, callback: F) -> Self
    where
        R: ReadSeek + 'static,
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        Self {
            source: Mutex::new(Box::new(source)),
            state: Mutex::new(ProgressState { read: 0, size }),
            callback: Box::new(callback),
        }
    }

    /// Open a file and wrap it, using its current length as the size.
    pub fn open<F>(path: impl AsRef<Path>, callback: F) -> io::Result<Self>
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self::new(file, size, callback))
    }

    /// Total size of the underlying source.
    pub fn size(&self) -> u64 {
        self.lock_state().size
    }

    /// Observed position reported to the callback so far.
    pub fn position(&self) -> u64 {
        self.lock_state().read
    }

    /// Current progress snapshot.
    pub fn state(&self) -> ProgressState {
        *self.lock_state()
    }

    /// Read from the current position of the source.
    ///
    /// Advances the observed counter by the bytes actually read.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.lock_source().read(buf)?;
        self.report(|state| state.read += n as u64);
        Ok(n)
    }

    /// Read `buf.len()` bytes starting at `offset`, stopping early only at
    /// end of data.
    ///
    /// Sets the observed counter to `offset + bytes_read`. The sequential
    /// position of the source is left untouched.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let n = {
            let mut source = self.lock_source();
            let cursor = source.stream_position()?;
            source.seek(SeekFrom::Start(offset))?;
            let result = read_full(&mut **source, buf);
            source.seek(SeekFrom::Start(cursor))?;
            result?
        };
        self.report(|state| state.read = offset + n as u64);
        Ok(n)
    }

    /// Reposition the underlying source.
    pub fn seek(&self, pos: SeekFrom) -> io::Result<u64> {
        self.lock_source().seek(pos)
    }

    /// Update the counter and invoke the callback as one unit.
    fn report(&self, update: impl FnOnce(&mut ProgressState)) {
        let mut state = self.lock_state();
        update(&mut state);
        (self.callback)(state.read, state.size);
    }

    fn lock_source(&self) -> MutexGuard<'_, Box<dyn ReadSeek>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProgressReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReader")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Fill `buf` from `source`, stopping early only at end of data.
fn read_full(source: &mut dyn ReadSeek, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// A bounded view over `[start, start + len)` of a shared [`ProgressReader`].
///
/// Reads go through [`ProgressReader::read_at`], so each view reports the
/// absolute position it has reached.
#[derive(Debug, Clone)]
pub struct SectionReader {
    reader: Arc<ProgressReader>,
    start: u64,
    offset: u64,
    end: u64,
}

impl SectionReader {
    /// Create a view of `len` bytes starting at `start`.
    pub fn new(reader: Arc<ProgressReader>, start: u64, len: u64) -> Self {
        Self {
            reader,
            start,
            offset: start,
            end: start.saturating_add(len),
        }
    }

    /// Length of the section in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Bytes not yet read from the section.
    pub fn remaining(&self) -> u64 {
        self.end - self.offset
    }

    /// Turn the section into a stream of blocks of at most `block_size`
    /// bytes, read on the blocking thread pool.
    ///
    /// Yields `UnexpectedEof` if the source ends before the section does.
    pub fn into_stream(self, block_size: usize) -> impl Stream<Item = io::Result<Vec<u8>>> + Send {
        let block_size = block_size.max(1);
        async_stream::try_stream! {
            let mut section = self;
            while section.remaining() > 0 {
                let (returned, block) = tokio::task::spawn_blocking(move || {
                    let block = section.read_block(block_size);
                    (section, block)
                })
                .await
                .map_err(io::Error::other)?;
                section = returned;
                yield block?;
            }
        }
    }

    fn read_block(&mut self, block_size: usize) -> io::Result<Vec<u8>> {
        let want = usize::try_from(self.remaining()).map_or(block_size, |r| r.min(block_size));
        let mut buf = vec![0u8; want];
        let n = self.read(&mut buf)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "source ended at offset {} before section end {}",
                    self.offset, self.end
                ),
            ));
        }
        buf.truncate(n);
        Ok(buf)
    }
}

impl Read for SectionReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.offset >= self.end || buf.is_empty() {
            return Ok(0);
        }
        let max = usize::try_from(self.remaining()).map_or(buf.len(), |r| r.min(buf.len()));
        let n = self.reader.read_at(&mut buf[..max], self.offset)?;
        self.offset += n as u64;
        Ok(n)
    }
}
