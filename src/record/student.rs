//! Fixed-width student record.

use std::fmt;

use crate::common::config::RECORD_SIZE;

/// One row of the record file.
///
/// # Layout (64 bytes, big-endian)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     id
/// 8       20    last_name (UTF-8, zero padded)
/// 28      20    first_name (UTF-8, zero padded)
/// 48      2     grade (UTF-8, zero padded)
/// 50      6     (unused, zero)
/// 56      8     overflow_link
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub grade: String,
    /// Link to a follow-up record; `-1` when unused.
    pub overflow_link: i64,
}

impl StudentRecord {
    pub const OFFSET_LAST_NAME: usize = 8;
    pub const OFFSET_FIRST_NAME: usize = 28;
    pub const OFFSET_GRADE: usize = 48;
    pub const OFFSET_OVERFLOW_LINK: usize = 56;

    pub const NAME_WIDTH: usize = 20;
    pub const GRADE_WIDTH: usize = 2;

    /// Create a record with no overflow link.
    pub fn new(id: i64, last_name: &str, first_name: &str, grade: &str) -> Self {
        Self {
            id,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            grade: grade.to_string(),
            overflow_link: -1,
        }
    }

    /// Encode into the fixed layout. Text longer than its field is cut at
    /// the last character boundary that fits.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[..8].copy_from_slice(&self.id.to_be_bytes());
        put_text(&mut buf, Self::OFFSET_LAST_NAME, Self::NAME_WIDTH, &self.last_name);
        put_text(&mut buf, Self::OFFSET_FIRST_NAME, Self::NAME_WIDTH, &self.first_name);
        put_text(&mut buf, Self::OFFSET_GRADE, Self::GRADE_WIDTH, &self.grade);
        buf[Self::OFFSET_OVERFLOW_LINK..].copy_from_slice(&self.overflow_link.to_be_bytes());
        buf
    }

    /// Decode from the fixed layout, trimming padding from text fields.
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let mut id = [0u8; 8];
        id.copy_from_slice(&buf[..8]);
        let mut link = [0u8; 8];
        link.copy_from_slice(&buf[Self::OFFSET_OVERFLOW_LINK..]);

        Self {
            id: i64::from_be_bytes(id),
            last_name: get_text(buf, Self::OFFSET_LAST_NAME, Self::NAME_WIDTH),
            first_name: get_text(buf, Self::OFFSET_FIRST_NAME, Self::NAME_WIDTH),
            grade: get_text(buf, Self::OFFSET_GRADE, Self::GRADE_WIDTH),
            overflow_link: i64::from_be_bytes(link),
        }
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Last Name: {}, First Name: {}, Grade: {}",
            self.id, self.last_name, self.first_name, self.grade
        )
    }
}

fn put_text(buf: &mut [u8], offset: usize, width: usize, text: &str) {
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buf[offset..offset + end].copy_from_slice(&text.as_bytes()[..end]);
}

fn get_text(buf: &[u8], offset: usize, width: usize) -> String {
    String::from_utf8_lossy(&buf[offset..offset + width])
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
