//! VP archive format (Volition `VPVP` containers)
//!
//! Read-only. Unlike PAK, the flat index encodes a directory tree through
//! sentinel entries rather than storing full paths per record.
//!
//! ## Layout
//!
//! All integers are little-endian.
//!
//! ```text
//! [0x00] Magic "VPVP"          (4 bytes)
//! [0x04] version               (i32, must be 2)
//! [0x08] dir_offset            (i32) absolute offset of the index
//! [0x0C] dir_entries           (i32) record count
//! [0x10] Member data
//! [dir_offset] Index           (dir_entries records of 44 bytes)
//! ```
//!
//! ## Index record (44 bytes)
//!
//! ```text
//! [0x00] offset                (i32) absolute offset of member bytes
//! [0x04] size                  (i32) member size in bytes
//! [0x08] name[32]              NUL-padded
//! [0x28] timestamp             (i32, unix seconds)
//! ```
//!
//! A record with `size == 0 && timestamp == 0` is a **directory marker**,
//! not a member: its name opens a directory level, and the special name
//! `".."` closes the current one. File records take their full path from
//! the directory levels open at that point in the walk. Markers never
//! appear in the member list.

mod archive;
mod error;
mod index;

pub use archive::VpArchive;
pub use error::{VpError, VpResult};
pub use index::{VpEntry, VP_MAGIC, VP_VERSION};
