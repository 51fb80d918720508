//! Line-preserving reads and atomic writes with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// One physical line split from its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line text without the terminator.
    pub text: String,
    /// The terminator exactly as read: `"\n"`, `"\r\n"` or empty at EOF.
    pub terminator: String,
}

impl Line {
    /// Reassemble the original bytes of the line.
    pub fn raw(&self) -> String {
        format!("{}{}", self.text, self.terminator)
    }
}

/// Split a raw line into its text and terminator.
pub fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(text) = raw.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = raw.strip_suffix('\n') {
        (text, "\n")
    } else {
        (raw, "")
    }
}

/// Streaming reader yielding lines together with their terminators.
///
/// Unlike [`BufRead::lines`], nothing is lost: concatenating every
/// [`Line::raw`] reproduces the input byte for byte.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Read the next line, or `None` at end of input.
    ///
    /// Invalid UTF-8 is reported as [`std::io::ErrorKind::InvalidData`].
    pub fn next_line(&mut self) -> std::io::Result<Option<Line>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let raw = std::str::from_utf8(&self.buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let (text, terminator) = split_terminator(raw);
        Ok(Some(Line {
            text: text.to_string(),
            terminator: terminator.to_string(),
        }))
    }
}

/// Open a file for line-by-line reading.
pub fn open_lines(path: &NormalizedPath) -> Result<LineReader<BufReader<File>>> {
    let native_path = path.to_native();
    let file = File::open(&native_path).map_err(|e| Error::io(&native_path, e))?;
    Ok(LineReader::new(BufReader::new(file)))
}

/// A locked temporary file that replaces its destination on commit.
///
/// The temp file lives next to the destination so the final rename stays
/// on one filesystem. Dropping the writer without committing removes the
/// temp file and leaves the destination untouched.
pub struct AtomicWriter {
    destination: PathBuf,
    temp_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl AtomicWriter {
    /// Create the temp file for `path` and lock it.
    pub fn create(path: &NormalizedPath) -> Result<Self> {
        let native_path = path.to_native();

        if let Some(parent) = native_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let temp_name = format!(
            ".{}.{}.tmp",
            native_path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            std::process::id()
        );
        let temp_path = native_path.with_file_name(&temp_name);

        let temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        // Keep the destination's permissions across the rename
        if let Ok(metadata) = fs::metadata(&native_path) {
            let _ = fs::set_permissions(&temp_path, metadata.permissions());
        }

        Ok(Self {
            destination: native_path,
            temp_path,
            writer: Some(BufWriter::new(temp_file)),
        })
    }

    /// Flush, sync and rename the temp file over the destination.
    pub fn commit(mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let file = writer
            .into_inner()
            .map_err(|e| Error::io(&self.temp_path, e.into_error()))?;
        file.sync_all().map_err(|e| Error::io(&self.temp_path, e))?;
        file.unlock().map_err(|_| Error::LockFailed {
            path: self.destination.clone(),
        })?;
        drop(file);

        if let Err(e) = fs::rename(&self.temp_path, &self.destination) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(Error::io(&self.destination, e));
        }
        tracing::debug!(path = %self.destination.display(), "Committed atomic write");
        Ok(())
    }

    fn writer(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("atomic writer already committed"))
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let mut writer = AtomicWriter::create(path)?;
    writer
        .write_all(content)
        .map_err(|e| Error::io(path.to_native(), e))?;
    writer.commit()
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}
