//! Metainfo projection and info-hash computation

use std::fmt;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::torrent::bencode::{BencodeValue, Parser};
use crate::torrent::error::{TorrentError, TorrentResult};

/// The 20-byte SHA-1 digest identifying a torrent swarm.
///
/// Computed over the raw bytes of the `info` dictionary's encoding in the
/// source document. Displays as 40 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Wrap a precomputed digest.
    pub fn new(digest: [u8; 20]) -> Self {
        Self(digest)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// One file described by the info dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative path, `/`-joined for multi-file torrents; the torrent
    /// name for single-file torrents
    pub path: String,
    /// File length in bytes
    pub length: i64,
    /// Optional MD5 digest, as the hex string the file carried
    pub md5sum: Option<String>,
    /// Optional SHA-1 digest, raw bytes
    pub sha1: Option<Vec<u8>>,
    /// Optional ed2k digest, raw bytes
    pub ed2k: Option<Vec<u8>>,
}

/// Parsed view of a `.torrent` metainfo document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentMetainfo {
    /// Primary tracker URL
    pub announce: Option<String>,
    /// `announce-list` tiers flattened into one list of tracker URLs
    pub announce_list: Vec<String>,
    /// Free-form comment
    pub comment: Option<String>,
    /// Creation time, unix seconds
    pub creation_date: Option<i64>,
    /// Declared text encoding of the document's strings
    pub encoding: Option<String>,
    /// Torrent name from the info dictionary
    pub name: String,
    /// Piece size in bytes
    pub piece_length: i64,
    /// SHA-1 digest per piece
    pub pieces: Vec<[u8; 20]>,
    /// Digest over the raw `info` value bytes
    pub info_hash: InfoHash,
    /// The torrent's files; exactly one for single-file torrents
    pub files: Vec<FileEntry>,
}

impl TorrentMetainfo {
    /// Read and parse a `.torrent` file.
    pub fn from_file(path: impl AsRef<Path>) -> TorrentResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a `.torrent` document from memory.
    ///
    /// The top level must be a single dictionary covering the whole
    /// input. The info-hash is taken over the raw byte span of the `info`
    /// value as it sits in `data`.
    pub fn from_bytes(data: &[u8]) -> TorrentResult<Self> {
        if data.first() != Some(&b'd') {
            return Err(TorrentError::NotADictionary);
        }

        // Walk the top-level dictionary one pair at a time, recording the
        // byte span of each value so the info span needs no second pass.
        let mut parser = Parser::new(data);
        parser.expect(b'd')?;
        let mut top: Vec<(Vec<u8>, BencodeValue)> = Vec::new();
        let mut info_span = None;
        loop {
            match parser.peek() {
                Some(b'e') => {
                    parser.expect(b'e')?;
                    break;
                }
                Some(_) => {
                    let key = parser.byte_string()?;
                    let start = parser.position();
                    let value = parser.parse_value()?;
                    if key == b"info" && info_span.is_none() {
                        info_span = Some(start..parser.position());
                    }
                    top.push((key, value));
                }
                None => {
                    return Err(TorrentError::InvalidFormat {
                        offset: parser.position(),
                        reason: "unterminated dictionary".to_string(),
                    });
                }
            }
        }
        if !parser.is_at_end() {
            return Err(TorrentError::TrailingData {
                offset: parser.position(),
            });
        }

        let top = BencodeValue::Dictionary(top);
        let info_span = info_span.ok_or(TorrentError::MissingField("info"))?;
        let info_hash = InfoHash::new(Sha1::digest(&data[info_span]).into());

        let info = top.get(b"info").ok_or(TorrentError::MissingField("info"))?;
        if info.as_dictionary().is_none() {
            return Err(TorrentError::InvalidField {
                field: "info",
                reason: "not a dictionary".to_string(),
            });
        }

        let name = text(info.get(b"name").ok_or(TorrentError::MissingField("name"))?)
            .ok_or(TorrentError::MissingField("name"))?;
        let piece_length = info
            .get(b"piece length")
            .and_then(BencodeValue::as_integer)
            .ok_or(TorrentError::MissingField("piece length"))?;
        let pieces = parse_pieces(
            info.get(b"pieces")
                .ok_or(TorrentError::MissingField("pieces"))?,
        )?;
        let files = parse_files(info, &name)?;

        Ok(Self {
            announce: top.get(b"announce").and_then(text),
            announce_list: parse_announce_list(top.get(b"announce-list")),
            comment: top.get(b"comment").and_then(text),
            creation_date: top.get(b"creation date").and_then(BencodeValue::as_integer),
            encoding: top.get(b"encoding").and_then(text),
            name,
            piece_length,
            pieces,
            info_hash,
            files,
        })
    }

    /// Sum of all file lengths.
    pub fn total_length(&self) -> i64 {
        self.files.iter().map(|file| file.length).sum()
    }
}

/// Decode a byte-string value as text.
///
/// UTF-8 when valid, otherwise Latin-1 byte-for-byte — legacy documents
/// predate the `encoding` key and carry single-byte text.
fn text(value: &BencodeValue) -> Option<String> {
    let bytes = value.as_bytes()?;
    match std::str::from_utf8(bytes) {
        Ok(s) => Some(s.to_string()),
        Err(_) => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Split the concatenated `pieces` digest blob into 20-byte hashes.
fn parse_pieces(value: &BencodeValue) -> TorrentResult<Vec<[u8; 20]>> {
    let blob = value.as_bytes().ok_or(TorrentError::InvalidField {
        field: "pieces",
        reason: "not a byte string".to_string(),
    })?;
    if blob.len() % 20 != 0 {
        return Err(TorrentError::InvalidField {
            field: "pieces",
            reason: format!("length {} is not a multiple of 20", blob.len()),
        });
    }
    Ok(blob
        .chunks_exact(20)
        .map(|chunk| {
            let mut digest = [0u8; 20];
            digest.copy_from_slice(chunk);
            digest
        })
        .collect())
}

/// Flatten `announce-list` (a list of tiers, each a list of URLs) into a
/// single tracker list. Leaves that are not byte strings are skipped, not
/// errors — the field is advisory.
fn parse_announce_list(value: Option<&BencodeValue>) -> Vec<String> {
    let mut urls = Vec::new();
    let Some(tiers) = value.and_then(BencodeValue::as_list) else {
        return urls;
    };
    for tier in tiers {
        let Some(tier) = tier.as_list() else { continue };
        for url in tier {
            if let Some(url) = text(url) {
                urls.push(url);
            }
        }
    }
    urls
}

/// Project the info dictionary's file description.
///
/// A `files` list means a multi-file torrent; otherwise `length` describes
/// the single file named by the torrent itself.
fn parse_files(info: &BencodeValue, name: &str) -> TorrentResult<Vec<FileEntry>> {
    let Some(file_list) = info.get(b"files") else {
        let length = info
            .get(b"length")
            .and_then(BencodeValue::as_integer)
            .ok_or(TorrentError::MissingField("length"))?;
        return Ok(vec![FileEntry {
            path: name.to_string(),
            length,
            md5sum: info.get(b"md5sum").and_then(text),
            sha1: info.get(b"sha1").and_then(|v| v.as_bytes().map(<[u8]>::to_vec)),
            ed2k: info.get(b"ed2k").and_then(|v| v.as_bytes().map(<[u8]>::to_vec)),
        }]);
    };

    let file_list = file_list.as_list().ok_or(TorrentError::InvalidField {
        field: "files",
        reason: "not a list".to_string(),
    })?;

    let mut files = Vec::with_capacity(file_list.len());
    for file in file_list {
        let length = file
            .get(b"length")
            .and_then(BencodeValue::as_integer)
            .ok_or(TorrentError::MissingField("length"))?;

        let components = file
            .get(b"path")
            .and_then(BencodeValue::as_list)
            .ok_or(TorrentError::MissingField("path"))?;
        let mut segments = Vec::with_capacity(components.len());
        for component in components {
            segments.push(text(component).ok_or(TorrentError::InvalidField {
                field: "path",
                reason: "component is not a byte string".to_string(),
            })?);
        }
        if segments.is_empty() {
            return Err(TorrentError::InvalidField {
                field: "path",
                reason: "empty component list".to_string(),
            });
        }

        files.push(FileEntry {
            path: segments.join("/"),
            length,
            md5sum: file.get(b"md5sum").and_then(text),
            sha1: file.get(b"sha1").and_then(|v| v.as_bytes().map(<[u8]>::to_vec)),
            ed2k: file.get(b"ed2k").and_then(|v| v.as_bytes().map(<[u8]>::to_vec)),
        });
    }
    Ok(files)
}
