#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for torrent metainfo parsing
//!
//! The load-bearing property: the info-hash is a function of the raw
//! `info` byte span and nothing else in the document.

use stowage_formats::torrent::{TorrentError, TorrentMetainfo, bencode};

fn bstr(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}

fn info_dict(name: &str) -> String {
    format!(
        "d{}i65536e{}{}{}i32768e{}{}e",
        bstr("length"),
        bstr("name"),
        bstr(name),
        bstr("piece length"),
        bstr("pieces"),
        bstr(&"P".repeat(40)),
    )
}

fn torrent(comment: &str, name: &str) -> String {
    format!(
        "d{}{}{}{}{}{}e",
        bstr("announce"),
        bstr("http://tracker.example/announce"),
        bstr("comment"),
        bstr(comment),
        bstr("info"),
        info_dict(name),
    )
}

#[test]
fn info_hash_ignores_bytes_outside_the_info_span() {
    let a = TorrentMetainfo::from_bytes(torrent("first comment", "file.bin").as_bytes()).unwrap();
    let b = TorrentMetainfo::from_bytes(torrent("another comment!", "file.bin").as_bytes()).unwrap();

    // Different surrounding document, identical info value.
    assert_eq!(a.info_hash, b.info_hash);
    assert_ne!(a.comment, b.comment);
}

#[test]
fn info_hash_tracks_every_byte_inside_the_info_span() {
    let a = TorrentMetainfo::from_bytes(torrent("same", "file.bin").as_bytes()).unwrap();
    let b = TorrentMetainfo::from_bytes(torrent("same", "file.bim").as_bytes()).unwrap();

    assert_ne!(a.info_hash, b.info_hash);
}

#[test]
fn info_hash_is_stable_across_reparses() {
    let doc = torrent("stable", "file.bin");
    let first = TorrentMetainfo::from_bytes(doc.as_bytes()).unwrap();
    let second = TorrentMetainfo::from_bytes(doc.as_bytes()).unwrap();

    assert_eq!(first.info_hash, second.info_hash);
    // Canonical rendering: 40 lowercase hex characters.
    let rendered = first.info_hash.to_string();
    assert_eq!(rendered.len(), 40);
    assert!(
        rendered
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    );
}

#[test]
fn negative_zero_integer_is_invalid_format() {
    let err = bencode::parse(b"i-0e").unwrap_err();
    assert!(matches!(err, TorrentError::InvalidFormat { .. }));

    // The same token inside a document poisons the whole parse.
    let doc = format!("d{}i-0e{}{}e", bstr("creation date"), bstr("info"), info_dict("x"));
    assert!(TorrentMetainfo::from_bytes(doc.as_bytes()).is_err());
}

#[test]
fn from_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.torrent");
    std::fs::write(&path, torrent("on disk", "file.bin")).unwrap();

    let meta = TorrentMetainfo::from_file(&path).unwrap();
    assert_eq!(meta.name, "file.bin");
    assert_eq!(meta.files.len(), 1);
    assert_eq!(meta.files[0].length, 65_536);
    assert_eq!(meta.pieces.len(), 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = TorrentMetainfo::from_file("/nonexistent/test.torrent").unwrap_err();
    assert!(matches!(err, TorrentError::Io(_)));
}

#[test]
fn deeply_nested_document_is_refused_not_overflowed() {
    let mut doc = Vec::new();
    doc.extend(std::iter::repeat_n(b'l', 100_000));
    doc.extend(std::iter::repeat_n(b'e', 100_000));

    let err = bencode::parse(&doc).unwrap_err();
    assert!(matches!(err, TorrentError::TooDeeplyNested { .. }));
}
