//! Error types for PAK archive operations

use std::path::PathBuf;
use thiserror::Error;

use crate::cursor::CursorError;

/// PAK operation result type
pub type PakResult<T> = Result<T, PakError>;

/// Errors produced while opening, reading, or appending to a PAK archive
#[derive(Debug, Error)]
pub enum PakError {
    /// The archive path does not exist
    #[error("archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    /// The first four bytes are not the `PACK` magic
    #[error("not a PAK archive: bad magic {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// A header field carries a value the format cannot mean
    #[error("invalid PAK header: {0}")]
    InvalidHeader(String),

    /// The file ended before the FAT (or a read within it) was complete
    #[error("truncated archive: {0}")]
    Truncated(#[from] CursorError),

    /// An entry's byte range lies outside the archive file
    #[error(
        "entry '{name}' is out of bounds: offset {offset} + size {size} exceeds archive length {archive_len}"
    )]
    EntryOutOfBounds {
        /// Normalized entry name
        name: String,
        /// Entry offset from the FAT
        offset: u32,
        /// Entry size from the FAT
        size: u32,
        /// Current archive file length
        archive_len: u64,
    },

    /// Append attempted on an archive opened without write access
    #[error("archive was opened read-only")]
    WriteNotPermitted,

    /// An entry name does not fit the 56-byte FAT field
    #[error("entry name '{name}' exceeds {max} bytes")]
    NameTooLong {
        /// The offending name (normalized)
        name: String,
        /// Maximum usable name length in bytes
        max: usize,
    },

    /// An entry name contains characters outside the single-byte range
    #[error("entry name '{name}' is not representable in the FAT")]
    InvalidName {
        /// The offending name (normalized)
        name: String,
    },

    /// Appending would push the archive past what 32-bit FAT fields address
    #[error("archive would grow past the 32-bit format limit ({len} bytes)")]
    ArchiveTooLarge {
        /// Resulting archive length
        len: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
