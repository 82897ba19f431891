//! Record store - the flat student files the index points into.
//!
//! - [`StudentRecord`] - 64-byte fixed-width record
//! - [`RecordFile`] - Append-only file of records
//! - [`Database`] - Record files plus the id index

mod database;
mod record_file;
mod student;

pub use database::{Database, LoadReport};
pub use record_file::RecordFile;
pub use student::StudentRecord;
