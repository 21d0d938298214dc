//! Container format readers for flat binary-indexed game archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! This crate parses three container formats that share one shape: a magic
//! header, a flat index describing member entries (name, offset, size), and
//! random-access extraction of member bytes.
//!
//! # Supported Formats
//!
//! - **PAK**: `PACK` magic + file-allocation-table archives. The one
//!   mutable format: members can be appended and the FAT rewritten.
//! - **VP**: `VPVP` magic + trailing index with directory nesting encoded
//!   via sentinel entries. Read-only.
//! - **Torrent**: bencoded `.torrent` metainfo with the SHA-1 info-hash
//!   computed over the raw bytes of the `info` dictionary. Read-only.
//!
//! # Design Principles
//!
//! - **Eager indexing**: archive indices are read fully into memory at open
//!   time; member bytes are read on demand.
//! - **Fresh handles**: extraction opens its own file handle per call, so
//!   independent readers never share a seek position.
//! - **Soft-fail lookups**: extracting a name that is not present is normal
//!   control flow (`Ok(false)`), never an error. Structural failures at
//!   open time are typed errors.

#![warn(missing_docs)]

pub mod cursor;
pub mod pak;
pub mod torrent;
pub mod vp;

pub use cursor::{BinaryCursor, CursorError};
pub use pak::PakArchive;
pub use torrent::{BencodeValue, InfoHash, TorrentMetainfo};
pub use vp::VpArchive;
