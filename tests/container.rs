//! Container packing and unpacking through the file system.

mod common;

use tempfile::TempDir;
use zpack::progress::StatisticsProgress;
use zpack::{
    ContainerReader, ContainerWriter, Error, HEADER_LEN, MemberSource, NoProgress, PackOptions,
    PathSafety, RecordField, UnpackOptions, build_archive, compress_file, decompress_bytes,
    extract_archive, list_archive,
};

#[test]
fn test_pack_two_compressed_files_and_unpack_in_order() {
    let dir = TempDir::new().unwrap();
    let manifest = common::write_file(dir.path(), "manifest.xml", &common::markup_bytes(10));
    let page = common::write_file(dir.path(), "page_1.xml", &common::markup_bytes(500));
    let manifest_c = dir.path().join("manifest.cxml");
    let page_c = dir.path().join("page_1.cxml");
    compress_file(&manifest, &manifest_c).unwrap();
    compress_file(&page, &page_c).unwrap();

    let container = dir.path().join("book.dqf");
    let mut writer = ContainerWriter::create_path(&container).unwrap();
    writer.append_member("manifest.cxml", &manifest_c).unwrap();
    writer.append_member("page_1.cxml", &page_c).unwrap();
    let result = writer.finish().unwrap();

    let expected_len = 2 * HEADER_LEN as u64
        + std::fs::metadata(&manifest_c).unwrap().len()
        + std::fs::metadata(&page_c).unwrap().len();
    assert_eq!(result.bytes_written, expected_len);
    assert_eq!(std::fs::metadata(&container).unwrap().len(), expected_len);

    let out = dir.path().join("res");
    std::fs::create_dir(&out).unwrap();
    let mut reader = ContainerReader::open_path(&container).unwrap();

    let first = reader.read_next_member(&out).unwrap().unwrap();
    assert_eq!(first.name.to_str(), Some("manifest.cxml"));
    let second = reader.read_next_member(&out).unwrap().unwrap();
    assert_eq!(second.name.to_str(), Some("page_1.cxml"));
    assert!(reader.read_next_member(&out).unwrap().is_none());

    // Unpacked payloads are byte-identical to the packed inputs.
    assert_eq!(
        std::fs::read(out.join("manifest.cxml")).unwrap(),
        std::fs::read(&manifest_c).unwrap()
    );
    let page_restored = decompress_bytes(&std::fs::read(out.join("page_1.cxml")).unwrap()).unwrap();
    assert_eq!(page_restored, common::markup_bytes(500));
}

#[test]
fn test_single_member_layout() {
    let (bytes, result) = common::create_container_with_result(&[("a.bin", b"payload")]).unwrap();
    assert_eq!(bytes.len(), 20 + 8 + 7);
    assert_eq!(result.members[0].payload_offset(), 28);
    assert_eq!(bytes, common::raw_record(&common::name_field("a.bin"), 7, b"payload"));
}

#[test]
fn test_name_of_exactly_twenty_bytes() {
    let dir = TempDir::new().unwrap();
    let bytes = common::create_container(&[("abcdefghijklmnop.txt", b"x")]).unwrap();
    assert_eq!(&bytes[..20], b"abcdefghijklmnop.txt");

    let info = ContainerReader::new(&bytes[..])
        .read_next_member(dir.path())
        .unwrap()
        .unwrap();
    assert_eq!(info.name.to_str(), Some("abcdefghijklmnop.txt"));
}

#[test]
fn test_name_too_long_is_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let source = common::write_file(dir.path(), "src", b"data");
    let container = dir.path().join("c.dqf");
    let mut writer = ContainerWriter::create_path(&container).unwrap();
    let err = writer
        .append_member("twenty_one_byte_name!", &source)
        .unwrap_err();
    assert!(matches!(err, Error::NameTooLong { len: 21, .. }));
    writer.finish().unwrap();
    assert_eq!(std::fs::metadata(&container).unwrap().len(), 0);
}

#[test]
fn test_legacy_padding_garbage_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut field = [0x5Au8; 20];
    field[..7].copy_from_slice(b"a.cxml\0");
    let bytes = common::raw_record(&field, 3, b"abc");

    let info = ContainerReader::new(&bytes[..])
        .read_next_member(dir.path())
        .unwrap()
        .unwrap();
    assert_eq!(info.name.to_str(), Some("a.cxml"));
    assert_eq!(std::fs::read(dir.path().join("a.cxml")).unwrap(), b"abc");
}

#[test]
fn test_large_member_streamed() {
    let dir = TempDir::new().unwrap();
    let data = common::random_bytes(300_000, 3);
    let source = common::write_file(dir.path(), "big", &data);
    let container = dir.path().join("c.dqf");

    let mut writer = ContainerWriter::create_path(&container)
        .unwrap()
        .max_buffered_member(1024);
    writer.append_member("big", &source).unwrap();
    writer.finish().unwrap();

    let out = TempDir::new().unwrap();
    let result = extract_archive(&container, out.path(), &UnpackOptions::default(), NoProgress)
        .unwrap();
    assert_eq!(result.bytes_written, data.len() as u64);
    assert_eq!(std::fs::read(out.path().join("big")).unwrap(), data);
}

#[test]
fn test_build_archive_end_to_end() {
    let dir = TempDir::new().unwrap();
    let a = common::write_file(dir.path(), "manifest.xml", &common::markup_bytes(3));
    let b = common::write_file(dir.path(), "page_1.xml", &common::markup_bytes(30));
    let container = dir.path().join("book.dqf");

    let sources = [
        MemberSource::new(&a, "manifest.cxml"),
        MemberSource::new(&b, "page_1.cxml"),
    ];
    let mut progress = StatisticsProgress::new();
    let packed =
        build_archive(&container, &sources, &PackOptions::default(), &mut progress).unwrap();
    assert_eq!(progress.total_members, 2);
    assert_eq!(progress.entries_done, 2);
    assert!(progress.warnings.is_empty());

    let listed = list_archive(&container).unwrap();
    assert_eq!(listed, packed.members);

    let out = dir.path().join("res");
    extract_archive(&container, &out, &UnpackOptions::default(), NoProgress).unwrap();
    for (name, pages) in [("manifest.cxml", 3), ("page_1.cxml", 30)] {
        let restored = decompress_bytes(&std::fs::read(out.join(name)).unwrap()).unwrap();
        assert_eq!(restored, common::markup_bytes(pages));
    }
}

#[test]
fn test_rebuild_truncates_existing_container() {
    let dir = TempDir::new().unwrap();
    let container = common::write_file(dir.path(), "c.dqf", &vec![0xAB; 50_000]);
    let source = common::write_file(dir.path(), "in", b"small");

    build_archive(
        &container,
        &[MemberSource::new(&source, "in")],
        &PackOptions::default(),
        NoProgress,
    )
    .unwrap();
    assert_eq!(list_archive(&container).unwrap().len(), 1);
}

#[test]
fn test_truncated_payload_keeps_earlier_members() {
    let dir = TempDir::new().unwrap();
    let bytes = common::create_container(&[("x", b"complete"), ("y", b"cut short")]).unwrap();
    let container = common::write_file(dir.path(), "c.dqf", &bytes[..bytes.len() - 4]);
    let out = dir.path().join("out");

    let err = extract_archive(&container, &out, &UnpackOptions::default(), NoProgress).unwrap_err();
    assert!(matches!(
        err,
        Error::Truncated {
            field: RecordField::Payload,
            expected: 9,
            actual: 5
        }
    ));
    assert_eq!(std::fs::read(out.join("x")).unwrap(), b"complete");
}

#[test]
fn test_relaxed_policy_extracts_nested_names() {
    let dir = TempDir::new().unwrap();
    let bytes =
        common::create_container(&[("pages/p1.cxml", b"1"), ("pages/p2.cxml", b"2")]).unwrap();
    let container = common::write_file(dir.path(), "c.dqf", &bytes);
    let out = dir.path().join("out");

    let strict = extract_archive(&container, &out, &UnpackOptions::default(), NoProgress);
    assert!(strict.unwrap_err().is_security_error());

    let options = UnpackOptions::new().path_safety(PathSafety::Relaxed);
    let result = extract_archive(&container, &out, &options, NoProgress).unwrap();
    assert_eq!(result.members.len(), 2);
    assert_eq!(std::fs::read(out.join("pages").join("p2.cxml")).unwrap(), b"2");
}
