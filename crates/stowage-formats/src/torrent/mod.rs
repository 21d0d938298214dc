//! BitTorrent `.torrent` metainfo parsing
//!
//! A `.torrent` file is one bencoded dictionary. The grammar has four
//! productions:
//!
//! ```text
//! integer      i<digits>e          (optional leading '-'; no '-0', no
//!                                   leading zeros)
//! byte string  <length>:<bytes>    (decimal length prefix)
//! list         l<values>e
//! dictionary   d<(key value)*>e    (keys are byte strings)
//! ```
//!
//! [`bencode`] is the recursive-descent parser over these productions with
//! an explicit nesting-depth guard. [`TorrentMetainfo`] projects the
//! parsed dictionary into announce/comment/file fields and computes the
//! SHA-1 **info-hash** over the exact raw byte span of the `info` value —
//! the swarm identifier must be byte-identical to what every other client
//! hashes, so it is never computed from a re-serialization.
//!
//! Read-only: this crate does not write torrent files.

pub mod bencode;
mod error;
mod metainfo;

pub use bencode::{BencodeValue, MAX_DEPTH};
pub use error::{TorrentError, TorrentResult};
pub use metainfo::{FileEntry, InfoHash, TorrentMetainfo};
