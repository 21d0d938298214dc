#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for VP archive parsing and extraction
//!
//! VP files are built byte-by-byte in the tests; the format's directory
//! markers make the index layout the interesting part.

use std::path::Path;

use stowage_formats::vp::{VpArchive, VpError};

const HEADER_SIZE: u32 = 16;

fn record(offset: u32, size: u32, name: &str, timestamp: u32) -> Vec<u8> {
    let mut raw = Vec::with_capacity(44);
    raw.extend_from_slice(&offset.to_le_bytes());
    raw.extend_from_slice(&size.to_le_bytes());
    let mut field = [0u8; 32];
    field[..name.len()].copy_from_slice(name.as_bytes());
    raw.extend_from_slice(&field);
    raw.extend_from_slice(&timestamp.to_le_bytes());
    raw
}

/// Assemble a VP file: header, member data, trailing index.
fn build_vp(path: &Path, data: &[u8], records: &[Vec<u8>]) {
    let dir_offset = HEADER_SIZE + data.len() as u32;
    let mut raw = Vec::new();
    raw.extend_from_slice(b"VPVP");
    raw.extend_from_slice(&2i32.to_le_bytes());
    raw.extend_from_slice(&(dir_offset as i32).to_le_bytes());
    raw.extend_from_slice(&(records.len() as i32).to_le_bytes());
    raw.extend_from_slice(data);
    for r in records {
        raw.extend_from_slice(r);
    }
    std::fs::write(path, raw).unwrap();
}

#[test]
fn directory_markers_reconstruct_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assets.vp");

    let m1 = b"0123456789";
    let readme = b"hello";
    let mut data = Vec::new();
    data.extend_from_slice(m1);
    data.extend_from_slice(readme);

    build_vp(
        &path,
        &data,
        &[
            record(0, 0, "data", 0),
            record(0, 0, "maps", 0),
            record(HEADER_SIZE, m1.len() as u32, "m1.fs2", 1_000_000_000),
            record(0, 0, "..", 0),
            record(0, 0, "..", 0),
            record(
                HEADER_SIZE + m1.len() as u32,
                readme.len() as u32,
                "readme.txt",
                1_000_000_001,
            ),
        ],
    );

    let archive = VpArchive::open(&path).unwrap();
    let paths: Vec<&str> = archive
        .entries()
        .iter()
        .map(|entry| entry.path.as_str())
        .collect();
    assert_eq!(paths, vec!["data/maps/m1.fs2", "readme.txt"]);

    assert!(archive.exists("data/maps/m1.fs2"));
    assert!(archive.exists("DATA\\MAPS\\M1.FS2"));
    assert!(!archive.exists("data/m1.fs2"));
}

#[test]
fn extraction_round_trips_member_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extract.vp");

    let payload = b"mission file contents";
    build_vp(
        &path,
        payload,
        &[record(
            HEADER_SIZE,
            payload.len() as u32,
            "m1.fs2",
            1_000_000_000,
        )],
    );

    let archive = VpArchive::open(&path).unwrap();
    let mut sink = Vec::new();
    assert!(archive.extract_to_sink("m1.fs2", &mut sink).unwrap());
    assert_eq!(sink, payload);

    // Missing members are a soft no-op.
    let mut untouched = Vec::new();
    assert!(!archive.extract_to_sink("m2.fs2", &mut untouched).unwrap());
    assert!(untouched.is_empty());

    let out = dir.path().join("m1.fs2");
    assert!(archive.extract_to_file("m1.fs2", &out).unwrap());
    assert_eq!(std::fs::read(&out).unwrap(), payload);
}

#[test]
fn wrong_magic_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.vp");
    std::fs::write(&path, b"VPXX\x02\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00").unwrap();

    let err = VpArchive::open(&path).unwrap_err();
    assert!(matches!(err, VpError::InvalidMagic(m) if &m == b"VPXX"));
}

#[test]
fn unsupported_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v3.vp");
    std::fs::write(&path, b"VPVP\x03\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00").unwrap();

    let err = VpArchive::open(&path).unwrap_err();
    assert!(matches!(err, VpError::UnsupportedVersion(3)));
}

#[test]
fn index_with_no_files_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    // No records at all.
    let empty = dir.path().join("empty.vp");
    build_vp(&empty, &[], &[]);
    assert!(matches!(
        VpArchive::open(&empty).unwrap_err(),
        VpError::EmptyArchive
    ));

    // Only directory markers, no files.
    let markers = dir.path().join("markers.vp");
    build_vp(
        &markers,
        &[],
        &[record(0, 0, "data", 0), record(0, 0, "..", 0)],
    );
    assert!(matches!(
        VpArchive::open(&markers).unwrap_err(),
        VpError::EmptyArchive
    ));
}

#[test]
fn truncated_index_fails_open_with_eof() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trunc.vp");
    build_vp(
        &path,
        b"xx",
        &[record(HEADER_SIZE, 2, "a.txt", 1_000_000_000)],
    );

    let full = std::fs::read(&path).unwrap();
    std::fs::write(&path, &full[..full.len() - 8]).unwrap();

    let err = VpArchive::open(&path).unwrap_err();
    assert!(matches!(err, VpError::Truncated(_)));
}

#[test]
fn missing_archive_is_a_typed_error() {
    let err = VpArchive::open("/nonexistent/thing.vp").unwrap_err();
    assert!(matches!(err, VpError::ArchiveNotFound(_)));
}

#[test]
fn out_of_bounds_entry_fails_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oob.vp");
    // Entry claims 100 bytes the file does not have.
    build_vp(
        &path,
        b"xx",
        &[record(HEADER_SIZE, 100, "big.bin", 1_000_000_000)],
    );

    let archive = VpArchive::open(&path).unwrap();
    let mut sink = Vec::new();
    let err = archive.extract_to_sink("big.bin", &mut sink).unwrap_err();
    assert!(matches!(err, VpError::EntryOutOfBounds { .. }));
    assert!(sink.is_empty());
}
