//! Database - the record files plus the id index.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::common::config::{IndexConfig, RECORD_SIZE};
use crate::common::{Error, Result};
use crate::index::Index;
use crate::record::{RecordFile, StudentRecord};

/// Outcome of [`Database::load_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records appended and indexed.
    pub loaded: usize,
    /// Malformed lines that were skipped.
    pub skipped: usize,
}

/// A student database stored as three files next to each other:
///
/// ```text
/// <base>.db        main record file (append-only)
/// <base>.overflow  staged replacement records, folded in by merge
/// <base>.index     B+ tree mapping id -> offset in <base>.db
/// ```
pub struct Database {
    records: RecordFile,
    overflow: RecordFile,
    index: Index,
}

impl Database {
    /// Open or create the database named `base`.
    pub fn open<P: AsRef<Path>>(base: P) -> Result<Self> {
        Self::open_with(base, IndexConfig::default())
    }

    /// Open or create the database named `base` with an index configuration.
    pub fn open_with<P: AsRef<Path>>(base: P, config: IndexConfig) -> Result<Self> {
        let base = base.as_ref();
        let db = Self {
            records: RecordFile::open(with_suffix(base, ".db"))?,
            overflow: RecordFile::open(with_suffix(base, ".overflow"))?,
            index: Index::open_with(with_suffix(base, ".index"), config)?,
        };
        info!(base = %base.display(), records = db.records.len() / RECORD_SIZE as u64, "opened database");
        Ok(db)
    }

    /// Append `record` to the main file and index it. Returns its offset.
    pub fn add_record(&mut self, record: &StudentRecord) -> Result<u64> {
        let offset = self.records.append(record)?;
        self.index.insert(record.id, offset as i64)?;
        Ok(offset)
    }

    /// Look up the record indexed under `id`.
    pub fn find_record(&mut self, id: i64) -> Result<Option<StudentRecord>> {
        match self.index.search(id)? {
            Some(offset) => self.records.read_at(offset as u64).map(Some),
            None => Ok(None),
        }
    }

    /// Queue a replacement record in the overflow file. It becomes visible
    /// after the next [`merge_records`](Self::merge_records).
    pub fn stage_update(&mut self, record: &StudentRecord) -> Result<u64> {
        self.overflow.append(record)
    }

    /// Add every record of the comma-separated file at `path`.
    /// See [`load_records`](Self::load_records).
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        self.load_records(BufReader::new(File::open(path)?))
    }

    /// Add every record read from lines `id,last_name,first_name,grade`.
    ///
    /// Lines that are not UTF-8, have fewer than four fields or a non-numeric
    /// id are logged and skipped. Blank lines are ignored.
    ///
    /// # Errors
    /// Fails only if the input cannot be read or a record cannot be stored.
    pub fn load_records<R: BufRead>(&mut self, reader: R) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for (i, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let text = String::from_utf8_lossy(&bytes);
            if text.trim().is_empty() {
                continue;
            }

            let parsed = std::str::from_utf8(&bytes)
                .map_err(|e| Error::MalformedLine {
                    line: i + 1,
                    reason: format!("invalid UTF-8: {}", e),
                })
                .and_then(|line| parse_line(i + 1, line));

            match parsed {
                Ok(record) => {
                    self.add_record(&record)?;
                    report.loaded += 1;
                }
                Err(err) => {
                    warn!(%err, line = %text, "skipping invalid record");
                    report.skipped += 1;
                }
            }
        }

        info!(loaded = report.loaded, skipped = report.skipped, "load completed");
        Ok(report)
    }

    /// Rewrite the main file with one record per id and fold in the
    /// overflow file. Returns the number of records kept.
    ///
    /// The latest main record for an id wins, not the first one, so a merge
    /// keeps what [`find_record`](Self::find_record) already returned. An
    /// overflow record beats any main record. Both files are truncated and the survivors are
    /// appended in id order and re-indexed; each new index entry shadows the
    /// stale one for the same id.
    pub fn merge_records(&mut self) -> Result<usize> {
        let mut latest = BTreeMap::new();
        for (_, record) in self.records.records()? {
            latest.insert(record.id, record);
        }
        for (_, record) in self.overflow.records()? {
            latest.insert(record.id, record);
        }

        self.records.truncate()?;
        self.overflow.truncate()?;

        for record in latest.values() {
            self.add_record(record)?;
        }

        info!(records = latest.len(), "merge completed");
        Ok(latest.len())
    }

    /// Flush every file to disk and close the database.
    pub fn close(mut self) -> Result<()> {
        self.records.sync()?;
        self.overflow.sync()?;
        self.index.close()
    }

    /// The id index.
    pub fn index(&mut self) -> &mut Index {
        &mut self.index
    }
}

/// `base` with `suffix` appended to its final component.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn parse_line(line_no: usize, line: &str) -> Result<StudentRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(Error::MalformedLine {
            line: line_no,
            reason: format!("expected 4 fields, found {}", fields.len()),
        });
    }

    let id = fields[0].parse::<i64>().map_err(|e| Error::MalformedLine {
        line: line_no,
        reason: format!("invalid id {:?}: {}", fields[0], e),
    })?;

    Ok(StudentRecord::new(id, fields[1], fields[2], fields[3]))
}
