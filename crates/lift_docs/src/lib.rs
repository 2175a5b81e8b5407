// Package formats: CSV tables, Markdown instructions, zip archives

pub mod archive;
pub mod csv;
pub mod markdown;

pub use archive::{ArchiveEntry, build_archive, read_archive};
pub use csv::{parse_csv, records_to_csv};
pub use markdown::{MarkdownDoc, generate_markdown_table};
