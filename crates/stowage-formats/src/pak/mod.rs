//! PAK archive format (Quake-style `PACK` containers)
//!
//! The one mutable format in this crate: existing archives can be opened
//! for appending, and fresh archives can be created empty.
//!
//! ## Layout
//!
//! All integers are little-endian.
//!
//! ```text
//! [0x00] Magic "PACK"          (4 bytes, case-sensitive)
//! [0x04] fat_start             (i32) absolute offset of the FAT
//! [0x08] fat_size              (i32) = entry_count * 64
//! [0x0C] Member data           (contiguous, unordered)
//! [fat_start] FAT              (entry_count records of 64 bytes)
//! ```
//!
//! ## FAT record (64 bytes)
//!
//! ```text
//! [0x00] name[56]              NUL-padded, forward-slash separators
//! [0x38] offset                (i32) absolute offset of member bytes
//! [0x3C] length                (i32) member size in bytes
//! ```
//!
//! The FAT always sits at the end of the file: after any flush,
//! `fat_start + entry_count * 64` equals the file length. Appending a
//! member overwrites the old FAT with the new member's bytes and rewrites
//! the FAT behind it.
//!
//! ## Name identity
//!
//! Entry names are case-insensitive with interchangeable slashes. In
//! memory they are kept lowercased with `/` separators; lookups normalize
//! the queried name the same way.

mod archive;
mod error;
mod fat;

pub use archive::PakArchive;
pub use error::{PakError, PakResult};
pub use fat::{PakEntry, FAT_RECORD_SIZE, PAK_MAGIC};
