//! Fixtures shared by the crate's unit tests.

use super::{FileRecord, RecordId};
use crate::source::MemorySource;
use std::io::{Cursor, Write};
use std::sync::Arc;
use time::OffsetDateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(crate) fn record(id: u64, name: &str, mime_type: &str) -> FileRecord {
    FileRecord {
        id: RecordId(id),
        name: name.to_string(),
        size: 3,
        mime_type: mime_type.to_string(),
        last_modified: OffsetDateTime::UNIX_EPOCH,
        source: Arc::new(MemorySource::new(b"abc".to_vec())),
        preview: None,
        assigned_name: None,
    }
}

/// A ZIP holding three files (one nested) and one directory entry.
pub(crate) fn zip_fixture() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("a.jpg", options).unwrap();
    writer.write_all(b"\xff\xd8\xff\xe0").unwrap();
    writer.add_directory("docs/", options).unwrap();
    writer.start_file("docs/b.txt", options).unwrap();
    writer.write_all(b"hello").unwrap();
    writer.start_file("docs/c.pdf", options).unwrap();
    writer.write_all(b"%PDF-1.4").unwrap();
    writer.finish().unwrap().into_inner()
}
