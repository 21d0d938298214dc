//! Error types for VP archive operations

use std::path::PathBuf;
use thiserror::Error;

use crate::cursor::CursorError;

/// VP operation result type
pub type VpResult<T> = Result<T, VpError>;

/// Errors produced while opening or reading a VP archive
#[derive(Debug, Error)]
pub enum VpError {
    /// The archive path does not exist
    #[error("archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    /// The first four bytes are not the `VPVP` magic
    #[error("not a VP archive: bad magic {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// The version field is not the supported version 2
    #[error("unsupported VP version: {0}")]
    UnsupportedVersion(i32),

    /// A header field carries a value the format cannot mean
    #[error("invalid VP header: {0}")]
    InvalidHeader(String),

    /// The index parsed to zero file entries
    #[error("archive index contains no file entries")]
    EmptyArchive,

    /// The file ended before the index (or a read within it) was complete
    #[error("truncated archive: {0}")]
    Truncated(#[from] CursorError),

    /// An entry's byte range lies outside the archive file
    #[error(
        "entry '{path}' is out of bounds: offset {offset} + size {size} exceeds archive length {archive_len}"
    )]
    EntryOutOfBounds {
        /// Full entry path
        path: String,
        /// Entry offset from the index
        offset: u32,
        /// Entry size from the index
        size: u32,
        /// Current archive file length
        archive_len: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
