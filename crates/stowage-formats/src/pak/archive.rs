//! PAK archive handle: open, lookup, extraction, append

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::cursor::{BinaryCursor, CursorError};
use crate::pak::error::{PakError, PakResult};
use crate::pak::fat::{
    self, FAT_RECORD_SIZE, HEADER_SIZE, PAK_MAGIC, PakEntry, normalize_name,
};

/// Copy buffer size for member extraction and appends
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// An opened PAK archive.
///
/// The FAT is held in memory; member bytes are read (and appended) through
/// a fresh file handle per call, so independent handles on the same
/// archive never share a seek position. Concurrent writers are not
/// coordinated — callers must serialize appends externally.
#[derive(Debug)]
pub struct PakArchive {
    path: PathBuf,
    write_access: bool,
    /// Absolute offset where the FAT lives, which is also where the next
    /// appended member's bytes go.
    fat_start: u64,
    entries: Vec<PakEntry>,
}

impl PakArchive {
    /// Open an existing archive and read its FAT into memory.
    ///
    /// `write_access` gates the append operations; extraction works either
    /// way.
    pub fn open(path: impl AsRef<Path>, write_access: bool) -> PakResult<Self> {
        let path = path.as_ref();
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PakError::ArchiveNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        Read::by_ref(&mut file)
            .take(HEADER_SIZE)
            .read_to_end(&mut header)?;

        let mut cursor = BinaryCursor::new(&header);
        let magic = cursor.read_exact(4)?;
        if magic != PAK_MAGIC {
            return Err(PakError::InvalidMagic([
                magic[0], magic[1], magic[2], magic[3],
            ]));
        }
        let fat_start = cursor.read_i32_le()?;
        let fat_size = cursor.read_i32_le()?;
        if fat_start < 0 || fat_size < 0 {
            return Err(PakError::InvalidHeader(format!(
                "fat_start {fat_start}, fat_size {fat_size}"
            )));
        }
        let entry_count = fat_size as usize / FAT_RECORD_SIZE;

        file.seek(SeekFrom::Start(fat_start as u64))?;
        // Capacity comes from the bounded read, not the header's claim.
        let mut fat_region = Vec::new();
        Read::by_ref(&mut file)
            .take(fat_size as u64)
            .read_to_end(&mut fat_region)?;

        // A FAT region shorter than the header promised trips the cursor's
        // EOF mid-record, which is the error the caller should see.
        let mut cursor = BinaryCursor::new(&fat_region);
        let entries = fat::parse_fat(&mut cursor, entry_count)?;

        Ok(Self {
            path: path.to_path_buf(),
            write_access,
            fat_start: fat_start as u64,
            entries,
        })
    }

    /// Create a fresh, empty archive at `path`.
    ///
    /// An existing file at the path is truncated; callers that must not
    /// clobber should check first.
    pub fn create_new(path: impl AsRef<Path>) -> PakResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&PAK_MAGIC)?;
        file.write_all(&(HEADER_SIZE as i32).to_le_bytes())?;
        file.write_all(&0i32.to_le_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Path this archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All member entries in FAT order.
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a member by name (case-insensitive, slash-insensitive).
    pub fn find(&self, name: &str) -> Option<&PakEntry> {
        let wanted = normalize_name(name);
        self.entries.iter().find(|entry| entry.name == wanted)
    }

    /// Whether a member with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Extract a member's bytes into `sink`.
    ///
    /// Returns `Ok(false)` without touching the sink when the name is not
    /// present — absence is normal control flow for callers probing a
    /// fallback chain. The member's byte range is bounds-checked against
    /// the current file length before any byte is copied.
    pub fn extract_to_sink<W: Write + ?Sized>(&self, name: &str, sink: &mut W) -> PakResult<bool> {
        let Some(entry) = self.find(name) else {
            return Ok(false);
        };

        let mut file = File::open(&self.path)?;
        let archive_len = file.metadata()?.len();
        let end = entry.offset as u64 + entry.size as u64;
        if end > archive_len {
            return Err(PakError::EntryOutOfBounds {
                name: entry.name.clone(),
                offset: entry.offset,
                size: entry.size,
                archive_len,
            });
        }

        file.seek(SeekFrom::Start(entry.offset as u64))?;
        copy_limited(&mut file, sink, entry.size as u64)?;
        Ok(true)
    }

    /// Extract a member to a file, creating or truncating it.
    ///
    /// When the member is absent nothing is created and `Ok(false)` is
    /// returned.
    pub fn extract_to_file(&self, name: &str, output: impl AsRef<Path>) -> PakResult<bool> {
        if !self.exists(name) {
            return Ok(false);
        }
        let mut out = File::create(output)?;
        self.extract_to_sink(name, &mut out)
    }

    /// Append a member from a reader.
    ///
    /// Returns `Ok(false)` when a member with this name already exists.
    /// Fails `WriteNotPermitted` when the archive was opened read-only and
    /// `NameTooLong`/`InvalidName` when the name cannot live in a FAT
    /// record.
    ///
    /// When `write_fat` is false the FAT and header are left on disk as
    /// they were; batch adders pass false for every member but the last
    /// (or call [`flush_fat`](Self::flush_fat) once at the end) to avoid
    /// rewriting the whole table per member. Until the flush, the on-disk
    /// archive does not list the new members.
    pub fn add_stream<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        name_in_archive: &str,
        write_fat: bool,
    ) -> PakResult<bool> {
        if !self.write_access {
            return Err(PakError::WriteNotPermitted);
        }
        let name = normalize_name(name_in_archive);
        // Validate up front so a bad name cannot leave half-appended bytes.
        fat::encode_name(&name)?;
        if self.entries.iter().any(|entry| entry.name == name) {
            return Ok(false);
        }

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(self.fat_start))?;
        let written = copy_all(reader, &mut file)?;

        let new_fat_start = self.fat_start + written;
        if new_fat_start > i32::MAX as u64 {
            // Back the data out; the FAT never learned about it.
            file.set_len(self.fat_start)?;
            return Err(PakError::ArchiveTooLarge { len: new_fat_start });
        }

        self.entries.push(PakEntry {
            name,
            offset: self.fat_start as u32,
            size: written as u32,
        });
        self.fat_start = new_fat_start;

        if write_fat {
            self.write_fat_to(&mut file)?;
        }
        Ok(true)
    }

    /// Append a member from a filesystem path.
    ///
    /// Failures reading the source file (missing, unreadable) are swallowed
    /// to `Ok(false)` so a batch import can continue with its next file;
    /// archive-side failures still propagate.
    pub fn add_file(
        &mut self,
        fs_path: impl AsRef<Path>,
        name_in_archive: &str,
        write_fat: bool,
    ) -> PakResult<bool> {
        let Ok(data) = std::fs::read(fs_path) else {
            return Ok(false);
        };
        self.add_stream(&mut data.as_slice(), name_in_archive, write_fat)
    }

    /// Serialize the in-memory FAT to disk and rewrite the header.
    ///
    /// Needed after a batch of [`add_stream`](Self::add_stream) calls made
    /// with `write_fat = false`.
    pub fn flush_fat(&mut self) -> PakResult<()> {
        if !self.write_access {
            return Err(PakError::WriteNotPermitted);
        }
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        self.write_fat_to(&mut file)
    }

    fn write_fat_to(&self, file: &mut File) -> PakResult<()> {
        file.seek(SeekFrom::Start(self.fat_start))?;
        for entry in &self.entries {
            file.write_all(&fat::encode_record(entry)?)?;
        }
        let fat_size = (self.entries.len() * FAT_RECORD_SIZE) as u64;
        // Invariant: fat_start + fat_size == file length.
        file.set_len(self.fat_start + fat_size)?;

        file.seek(SeekFrom::Start(4))?;
        file.write_all(&(self.fat_start as i32).to_le_bytes())?;
        file.write_all(&(fat_size as i32).to_le_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Copy exactly `len` bytes in bounded chunks.
fn copy_limited<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    len: u64,
) -> PakResult<()> {
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut left = len;
    while left > 0 {
        let want = left.min(COPY_CHUNK_SIZE as u64) as usize;
        let got = reader.read(&mut buf[..want])?;
        if got == 0 {
            return Err(PakError::Truncated(CursorError::UnexpectedEof {
                requested: want,
                remaining: 0,
            }));
        }
        writer.write_all(&buf[..got])?;
        left -= got as u64;
    }
    Ok(())
}

/// Copy a reader to exhaustion in bounded chunks, returning the byte count.
fn copy_all<R: Read + ?Sized, W: Write + ?Sized>(reader: &mut R, writer: &mut W) -> PakResult<u64> {
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let got = reader.read(&mut buf)?;
        if got == 0 {
            return Ok(written);
        }
        writer.write_all(&buf[..got])?;
        written += got as u64;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_new_writes_an_empty_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pak");

        PakArchive::create_new(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, b"PACK\x0c\x00\x00\x00\x00\x00\x00\x00");

        let archive = PakArchive::open(&path, false).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn missing_archive_is_a_typed_error() {
        let err = PakArchive::open("/nonexistent/thing.pak", false).unwrap_err();
        assert!(matches!(err, PakError::ArchiveNotFound(_)));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notpak.bin");
        std::fs::write(&path, b"PAK2\x0c\x00\x00\x00\x00\x00\x00\x00").unwrap();

        let err = PakArchive::open(&path, false).unwrap_err();
        assert!(matches!(err, PakError::InvalidMagic(m) if &m == b"PAK2"));
    }

    #[test]
    fn truncated_header_is_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pak");
        std::fs::write(&path, b"PACK\x0c\x00").unwrap();

        let err = PakArchive::open(&path, false).unwrap_err();
        assert!(matches!(err, PakError::Truncated(_)));
    }

    #[test]
    fn read_only_append_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.pak");
        PakArchive::create_new(&path).unwrap();

        let mut archive = PakArchive::open(&path, false).unwrap();
        let err = archive
            .add_stream(&mut &b"data"[..], "a.txt", true)
            .unwrap_err();
        assert!(matches!(err, PakError::WriteNotPermitted));
    }

    #[test]
    fn out_of_bounds_entry_fails_extraction_not_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.pak");
        PakArchive::create_new(&path).unwrap();
        let mut archive = PakArchive::open(&path, true).unwrap();
        archive.add_stream(&mut &b"12345"[..], "a.txt", true).unwrap();

        // Shrink the file under the entry's byte range.
        let reopened = PakArchive::open(&path, false).unwrap();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(HEADER_SIZE + 2).unwrap();

        let mut sink = Vec::new();
        let err = reopened.extract_to_sink("a.txt", &mut sink).unwrap_err();
        assert!(matches!(err, PakError::EntryOutOfBounds { .. }));
        assert!(sink.is_empty());
    }
}
