//! VP index record decoding and directory-path reconstruction

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::cursor::BinaryCursor;
use crate::vp::error::{VpError, VpResult};

/// VP magic bytes
pub const VP_MAGIC: [u8; 4] = *b"VPVP";

/// The only supported version field value
pub const VP_VERSION: i32 = 2;

/// Size of one on-disk index record
pub(crate) const INDEX_RECORD_SIZE: usize = 44;

/// Width of the NUL-padded name field within a record
const NAME_FIELD_SIZE: usize = 32;

/// A file member from a VP index, with its reconstructed full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpEntry {
    /// Root-relative path with `/` separators, in on-disk case
    pub path: String,
    /// Absolute offset of the member's bytes
    pub offset: u32,
    /// Member size in bytes
    pub size: u32,
    /// Modification time, unix seconds
    pub timestamp: u32,
}

impl VpEntry {
    /// The entry's modification time derived from its unix timestamp.
    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.timestamp as u64)
    }
}

/// Parse `record_count` index records, resolving directory markers into
/// full paths.
///
/// A marker is any record with `size == 0 && timestamp == 0`. A marker
/// named `".."` closes the current directory level; a stray `".."` at the
/// root is ignored, the same way an unterminated level at end-of-index is.
pub(crate) fn parse_index(
    cursor: &mut BinaryCursor<'_>,
    record_count: usize,
) -> VpResult<Vec<VpEntry>> {
    let mut segments: Vec<String> = Vec::new();
    let mut entries = Vec::new();

    for _ in 0..record_count {
        let offset = cursor.read_i32_le()?;
        let size = cursor.read_i32_le()?;
        let name = cursor.read_fixed_cstring(NAME_FIELD_SIZE)?;
        let timestamp = cursor.read_i32_le()?;

        if size == 0 && timestamp == 0 {
            if name == ".." {
                segments.pop();
            } else {
                segments.push(name);
            }
            continue;
        }

        if offset < 0 || size < 0 {
            return Err(VpError::InvalidHeader(format!(
                "index record '{name}' has negative offset or size"
            )));
        }

        let path = if segments.is_empty() {
            name
        } else {
            format!("{}/{name}", segments.join("/"))
        };
        entries.push(VpEntry {
            path,
            offset: offset as u32,
            size: size as u32,
            timestamp: timestamp as u32,
        });
    }

    Ok(entries)
}

/// Normalize a queried path for case-insensitive, slash-insensitive
/// comparison against stored entry paths.
pub(crate) fn paths_equal(stored: &str, queried: &str) -> bool {
    let queried = queried.replace('\\', "/");
    stored.eq_ignore_ascii_case(&queried)
}
