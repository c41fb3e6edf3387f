use seqpack::engine::container::{ContainerReader, ContainerWriter};
use seqpack::{Compression, ContainerRecord, PackError};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tempfile::TempDir;

fn write_container(path: &Path, compression: Compression, records: &[(&str, &[u8])]) {
    let mut writer = ContainerWriter::create(path, compression).unwrap();
    for (key, value) in records {
        writer.append(key, value).unwrap();
    }
    assert_eq!(writer.finish().unwrap(), records.len() as u64);
}

fn read_container(path: &Path) -> Vec<ContainerRecord> {
    ContainerReader::open(path)
        .unwrap()
        .collect::<seqpack::Result<_>>()
        .unwrap()
}

#[test]
fn test_round_trip_preserves_order_and_duplicates() {
    let tmp = TempDir::new().unwrap();
    let big = vec![7u8; 300_000];
    let records: [(&str, &[u8]); 4] = [
        ("/a", b"alpha"),
        ("/b", &big),
        ("/a", b"second alpha"),
        ("/empty", b""),
    ];
    for (name, compression) in [("plain", Compression::None), ("gz", Compression::Gzip)] {
        let path = tmp.path().join(name);
        write_container(&path, compression, &records);

        let reader = ContainerReader::open(&path).unwrap();
        assert_eq!(reader.compression(), compression);
        let read: Vec<ContainerRecord> = reader.collect::<seqpack::Result<_>>().unwrap();
        assert_eq!(read.len(), 4);
        for (got, (key, value)) in read.iter().zip(records.iter()) {
            assert_eq!(got.key, *key);
            assert_eq!(got.value, *value);
        }
    }
}

#[test]
fn test_empty_container_yields_nothing() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.seq");
    write_container(&path, Compression::Gzip, &[]);
    assert!(read_container(&path).is_empty());
}

#[test]
fn test_create_refuses_existing_destination() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("taken.seq");
    fs::write(&path, b"keep me").unwrap();
    let err = ContainerWriter::create(&path, Compression::None).err().unwrap();
    assert!(matches!(err, PackError::OutputAlreadyExists(_)));
    assert_eq!(fs::read(&path).unwrap(), b"keep me");
}

#[test]
fn test_open_missing_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = ContainerReader::open(&tmp.path().join("absent.seq"))
        .err()
        .unwrap();
    assert!(matches!(err, PackError::NotFound(_)));
}

#[test]
fn test_bad_magic_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("junk.seq");
    fs::write(&path, b"NOTAPACK\x01\x00").unwrap();
    let err = ContainerReader::open(&path).err().unwrap();
    assert!(matches!(err, PackError::ContainerCorrupt { .. }));
}

#[test]
fn test_truncated_record_is_corrupt_and_ends_iteration() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cut.seq");
    write_container(
        &path,
        Compression::None,
        &[("/one", b"first value"), ("/two", b"second value")],
    );
    let len = fs::metadata(&path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(len - 5)
        .unwrap();

    let mut reader = ContainerReader::open(&path).unwrap();
    assert_eq!(reader.next().unwrap().unwrap().key, "/one");
    assert!(matches!(
        reader.next(),
        Some(Err(PackError::ContainerCorrupt { .. }))
    ));
    assert!(reader.next().is_none());
}

#[test]
fn test_flipped_value_byte_fails_checksum() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("flip.seq");
    write_container(&path, Compression::None, &[("/k", b"payload")]);

    let mut bytes = fs::read(&path).unwrap();
    // header (10) + key_len (4) + key (2) + value_len (8)
    let value_start = 10 + 4 + 2 + 8;
    bytes[value_start] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let mut reader = ContainerReader::open(&path).unwrap();
    match reader.next() {
        Some(Err(PackError::ContainerCorrupt { offset, reason })) => {
            assert_eq!(offset, 10);
            assert!(reason.contains("checksum"));
        }
        other => panic!("expected checksum failure, got {other:?}"),
    }
}
