//! Error types for torrent metainfo parsing

use thiserror::Error;

use crate::cursor::CursorError;

/// Torrent operation result type
pub type TorrentResult<T> = Result<T, TorrentError>;

/// Errors produced while parsing bencoded data or projecting metainfo
#[derive(Debug, Error)]
pub enum TorrentError {
    /// The bencoding grammar was violated
    #[error("invalid bencoding at byte {offset}: {reason}")]
    InvalidFormat {
        /// Byte offset where the violation was detected
        offset: usize,
        /// What was violated
        reason: String,
    },

    /// The document nests deeper than the parser allows
    #[error("bencoded document nests deeper than {limit} levels")]
    TooDeeplyNested {
        /// The configured nesting limit
        limit: usize,
    },

    /// Bytes remain after the top-level value
    #[error("trailing data after the top-level dictionary at byte {offset}")]
    TrailingData {
        /// Offset of the first trailing byte
        offset: usize,
    },

    /// The top-level value is not a dictionary
    #[error("torrent metainfo must be a top-level dictionary")]
    NotADictionary,

    /// A required metainfo field is absent
    #[error("metainfo is missing required field '{0}'")]
    MissingField(&'static str),

    /// A metainfo field is present but malformed
    #[error("metainfo field '{field}' is invalid: {reason}")]
    InvalidField {
        /// The offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The data ended before a value was complete
    #[error("truncated document: {0}")]
    Truncated(#[from] CursorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
