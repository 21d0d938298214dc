//! VP archive handle: open, lookup, extraction

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::cursor::{BinaryCursor, CursorError};
use crate::vp::error::{VpError, VpResult};
use crate::vp::index::{self, INDEX_RECORD_SIZE, VP_MAGIC, VP_VERSION, VpEntry, paths_equal};

/// Header length: magic + version + dir_offset + dir_entries
const HEADER_SIZE: u64 = 16;

/// Copy buffer size for member extraction
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// An opened, read-only VP archive.
///
/// The index is read fully at open time, with directory markers resolved
/// into full member paths. Extraction opens a fresh file handle per call,
/// the same contract as [`PakArchive`](crate::pak::PakArchive).
#[derive(Debug)]
pub struct VpArchive {
    path: PathBuf,
    entries: Vec<VpEntry>,
}

impl VpArchive {
    /// Open an archive and parse its index into memory.
    ///
    /// Fails on a missing file, wrong magic, a version other than 2, a
    /// truncated index, or an index with no file entries — the legacy
    /// reader's "not opened" states, as typed errors.
    pub fn open(path: impl AsRef<Path>) -> VpResult<Self> {
        let path = path.as_ref();
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VpError::ArchiveNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        Read::by_ref(&mut file).take(HEADER_SIZE).read_to_end(&mut header)?;

        let mut cursor = BinaryCursor::new(&header);
        let magic = cursor.read_exact(4)?;
        if magic != VP_MAGIC {
            return Err(VpError::InvalidMagic([
                magic[0], magic[1], magic[2], magic[3],
            ]));
        }
        let version = cursor.read_i32_le()?;
        if version != VP_VERSION {
            return Err(VpError::UnsupportedVersion(version));
        }
        let dir_offset = cursor.read_i32_le()?;
        let dir_entries = cursor.read_i32_le()?;
        if dir_offset < 0 || dir_entries < 0 {
            return Err(VpError::InvalidHeader(format!(
                "dir_offset {dir_offset}, dir_entries {dir_entries}"
            )));
        }

        let index_size = dir_entries as u64 * INDEX_RECORD_SIZE as u64;
        file.seek(SeekFrom::Start(dir_offset as u64))?;
        // Capacity comes from the bounded read, not the header's claim.
        let mut index_region = Vec::new();
        Read::by_ref(&mut file).take(index_size).read_to_end(&mut index_region)?;

        let mut cursor = BinaryCursor::new(&index_region);
        let entries = index::parse_index(&mut cursor, dir_entries as usize)?;
        if entries.is_empty() {
            return Err(VpError::EmptyArchive);
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Path this archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All file members in index order, directory markers resolved away.
    pub fn entries(&self) -> &[VpEntry] {
        &self.entries
    }

    /// Number of file members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no file members.
    ///
    /// Always false for a successfully opened archive; kept for API
    /// symmetry with the `len` accessor.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a member by full path (case-insensitive, slash-insensitive).
    pub fn find(&self, full_path: &str) -> Option<&VpEntry> {
        self.entries
            .iter()
            .find(|entry| paths_equal(&entry.path, full_path))
    }

    /// Whether a member with this full path exists.
    pub fn exists(&self, full_path: &str) -> bool {
        self.find(full_path).is_some()
    }

    /// Extract a member's bytes into `sink`.
    ///
    /// `Ok(false)` without touching the sink when the path is not present;
    /// the byte range is bounds-checked against the current file length
    /// before any byte is copied.
    pub fn extract_to_sink<W: Write + ?Sized>(
        &self,
        full_path: &str,
        sink: &mut W,
    ) -> VpResult<bool> {
        let Some(entry) = self.find(full_path) else {
            return Ok(false);
        };

        let mut file = File::open(&self.path)?;
        let archive_len = file.metadata()?.len();
        let end = entry.offset as u64 + entry.size as u64;
        if end > archive_len {
            return Err(VpError::EntryOutOfBounds {
                path: entry.path.clone(),
                offset: entry.offset,
                size: entry.size,
                archive_len,
            });
        }

        file.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        let mut left = entry.size as u64;
        while left > 0 {
            let want = left.min(COPY_CHUNK_SIZE as u64) as usize;
            let got = file.read(&mut buf[..want])?;
            if got == 0 {
                return Err(VpError::Truncated(CursorError::UnexpectedEof {
                    requested: want,
                    remaining: 0,
                }));
            }
            sink.write_all(&buf[..got])?;
            left -= got as u64;
        }
        Ok(true)
    }

    /// Extract a member to a file, creating or truncating it.
    ///
    /// When the member is absent nothing is created and `Ok(false)` is
    /// returned.
    pub fn extract_to_file(&self, full_path: &str, output: impl AsRef<Path>) -> VpResult<bool> {
        if !self.exists(full_path) {
            return Ok(false);
        }
        let mut out = File::create(output)?;
        self.extract_to_sink(full_path, &mut out)
    }
}
