//! Two-column CSV table helpers shared by both stores.
//!
//! Rows are encoded and decoded one record at a time with the `csv` crate,
//! which handles quoting of commas, quotes, and newlines inside messages. A
//! malformed row is counted and skipped; it never fails the whole table.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use phishguard_core::Label;
use tempfile::NamedTempFile;

use crate::StoreError;

pub(crate) const HEADER: &[u8] = b"label,message\n";

/// Rows decoded from a table, plus a count of rows that were dropped for a
/// wrong field count, invalid UTF-8, an empty field, or an unknown label.
pub(crate) struct Decoded {
    pub rows: Vec<(Label, String)>,
    pub dropped: usize,
}

/// Encode rows as CSV without a header line.
pub(crate) fn encode_rows<'a>(
    rows: impl IntoIterator<Item = (Label, &'a str)>,
) -> Result<Vec<u8>, StoreError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for (label, message) in rows {
        writer.write_record([label.as_str(), message])?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::from(csv::Error::from(e.into_error())))
}

/// Decode table bytes. `has_header` skips the first record.
pub(crate) fn decode(bytes: &[u8], has_header: bool) -> Result<Decoded, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    let mut record = ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => match parse_row(&record) {
                Some(row) => rows.push(row),
                None => dropped += 1,
            },
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => dropped += 1,
        }
    }

    Ok(Decoded { rows, dropped })
}

fn parse_row(record: &ByteRecord) -> Option<(Label, String)> {
    if record.len() != 2 {
        return None;
    }
    let label = std::str::from_utf8(&record[0]).ok()?.parse::<Label>().ok()?;
    let message = std::str::from_utf8(&record[1]).ok()?;
    (!message.is_empty()).then(|| (label, message.to_string()))
}

/// Read a whole table file. Returns the decoded rows and the byte length
/// that was read.
pub(crate) fn read_file(path: &Path) -> Result<(Decoded, u64), StoreError> {
    let bytes = fs::read(path).map_err(StoreError::io(path))?;
    Ok((decode(&bytes, true)?, bytes.len() as u64))
}

/// Append pre-encoded rows, writing the header first if the file is new or
/// zero-length. The whole payload goes out in one `write_all`.
pub(crate) fn append_encoded(path: &Path, encoded: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut payload = Vec::with_capacity(HEADER.len() + encoded.len());
    if needs_header {
        payload.extend_from_slice(HEADER);
    }
    payload.extend_from_slice(encoded);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(StoreError::io(path))?;
    file.write_all(&payload).map_err(StoreError::io(path))?;
    file.flush().map_err(StoreError::io(path))?;
    Ok(())
}

/// Atomically replace the file with a header-only table.
pub(crate) fn reset(path: &Path) -> Result<(), StoreError> {
    replace(path, HEADER)
}

/// Atomically rewrite the file as the header plus whatever was appended
/// after byte offset `end`. Returns the retained tail.
pub(crate) fn reset_through(path: &Path, end: u64) -> Result<Vec<u8>, StoreError> {
    let current = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(StoreError::io(path)(e)),
    };
    let tail = usize::try_from(end)
        .ok()
        .and_then(|end| current.get(end..))
        .unwrap_or_default()
        .to_vec();

    let mut contents = Vec::with_capacity(HEADER.len() + tail.len());
    contents.extend_from_slice(HEADER);
    contents.extend_from_slice(&tail);
    replace(path, &contents)?;
    Ok(tail)
}

fn replace(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = ensure_parent(path)?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(StoreError::io(&dir))?;
    tmp.write_all(contents).map_err(StoreError::io(tmp.path()))?;
    tmp.as_file()
        .sync_all()
        .map_err(StoreError::io(tmp.path()))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(path)(e.error))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<PathBuf, StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;
    Ok(dir)
}

/// Advisory lock on a sidecar `<file>.lock`, so that appends and resets from
/// separate processes never interleave.
pub(crate) struct TableLock {
    path: PathBuf,
}

impl TableLock {
    pub fn for_table(table: &Path) -> Self {
        let mut name = table.as_os_str().to_owned();
        name.push(".lock");
        Self {
            path: PathBuf::from(name),
        }
    }

    pub fn exclusive<T>(
        &self,
        f: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        ensure_parent(&self.path)?;
        let file = self.open()?;
        let mut lock = fd_lock::RwLock::new(file);
        let _guard = lock.write().map_err(|source| StoreError::Lock {
            path: self.path.clone(),
            source,
        })?;
        f()
    }

    pub fn shared<T>(&self, f: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        ensure_parent(&self.path)?;
        let file = self.open()?;
        let lock = fd_lock::RwLock::new(file);
        let _guard = lock.read().map_err(|source| StoreError::Lock {
            path: self.path.clone(),
            source,
        })?;
        f()
    }

    fn open(&self) -> Result<File, StoreError> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(StoreError::io(&self.path))
    }
}
