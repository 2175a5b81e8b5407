use anyhow::{Context, Result};
use std::io::{Cursor, Read, Write};
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A named text file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: String,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Build a zip archive holding every entry verbatim, in the given order.
///
/// An empty entry list still yields a valid (empty) archive.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let buf = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(buf);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("Failed to create {}", entry.name))?;
        zip.write_all(entry.content.as_bytes())
            .with_context(|| format!("Failed to write {}", entry.name))?;
    }

    let cursor = zip.finish().context("Failed to finalize zip archive")?;
    Ok(cursor.into_inner())
}

/// Read every file of a zip archive back as UTF-8 text, in archive order.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("Failed to open zip archive")?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;
        let name = file.name().to_string();
        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Archive entry {name} is not valid UTF-8 text"))?;
        entries.push(ArchiveEntry { name, content });
    }

    Ok(entries)
}
