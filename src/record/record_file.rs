//! Record File - append-only flat file of fixed-width records.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::RECORD_SIZE;
use crate::common::{Error, Result};
use crate::record::StudentRecord;

/// A flat file of [`RECORD_SIZE`]-byte records.
///
/// Records are only ever appended; their byte offset is what the index
/// stores as the value for their id.
pub struct RecordFile {
    file: File,
    len: u64,
}

impl RecordFile {
    /// Open the record file at `path`, creating it if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }

    /// Append `record` and return the offset it was written at.
    pub fn append(&mut self, record: &StudentRecord) -> Result<u64> {
        let offset = self.len;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&record.to_bytes())?;
        self.len += RECORD_SIZE as u64;
        Ok(offset)
    }

    /// Read exactly one record at `offset`.
    ///
    /// # Errors
    /// Returns `Error::TruncatedRecord` if fewer than [`RECORD_SIZE`] bytes
    /// follow `offset`.
    pub fn read_at(&mut self, offset: u64) -> Result<StudentRecord> {
        if offset.checked_add(RECORD_SIZE as u64).map_or(true, |end| end > self.len) {
            return Err(Error::TruncatedRecord(offset));
        }

        let mut buf = [0u8; RECORD_SIZE];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(StudentRecord::from_bytes(&buf))
    }

    /// Every complete record in file order, with its offset.
    pub fn records(&mut self) -> Result<Vec<(u64, StudentRecord)>> {
        let count = self.len / RECORD_SIZE as u64;
        (0..count)
            .map(|i| {
                let offset = i * RECORD_SIZE as u64;
                self.read_at(offset).map(|record| (offset, record))
            })
            .collect()
    }

    /// Drop every record.
    pub fn truncate(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.len = 0;
        Ok(())
    }

    /// Force written records to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// File length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
