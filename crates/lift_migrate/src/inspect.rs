use lift_core::{DataType, LiftError};
use lift_docs::{generate_markdown_table, parse_csv, read_archive};

/// One file found inside a migration package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub lines: usize,
    /// Data rows, for CSV files only.
    pub records: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSummary {
    pub files: Vec<FileSummary>,
}

impl PackageSummary {
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn record_count(&self, data: DataType) -> Option<usize> {
        let name = data.file_name();
        self.files
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.records)
    }

    pub fn to_markdown(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .files
            .iter()
            .map(|f| {
                vec![
                    f.name.clone(),
                    f.lines.to_string(),
                    f.records.map_or_else(|| "-".to_string(), |n| n.to_string()),
                ]
            })
            .collect();
        generate_markdown_table(&["File", "Lines", "Records"], &rows)
    }
}

/// Read a migration package back and count what it holds.
pub fn inspect_package(bytes: &[u8]) -> Result<PackageSummary, LiftError> {
    let entries = read_archive(bytes).map_err(|e| LiftError::Archive(format!("{e:#}")))?;

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let records = if entry.name.ends_with(".csv") {
            let (_, rows) = parse_csv(&entry.content)
                .map_err(|e| LiftError::Format(format!("{}: {e:#}", entry.name)))?;
            Some(rows.len())
        } else {
            None
        };
        files.push(FileSummary {
            lines: entry.content.lines().count(),
            name: entry.name,
            records,
        });
    }

    Ok(PackageSummary { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_docs::{ArchiveEntry, build_archive};

    #[test]
    fn test_inspect_counts_csv_rows() {
        let bytes = build_archive(&[
            ArchiveEntry::new("customers.csv", "Customer ID,Name\nCUST-0001,\"A, B\"\nCUST-0002,C\n"),
            ArchiveEntry::new("README.md", "# Title\n\nBody\n"),
        ])
        .unwrap();

        let summary = inspect_package(&bytes).unwrap();
        assert_eq!(summary.file_names(), vec!["customers.csv", "README.md"]);
        assert_eq!(summary.record_count(DataType::Customers), Some(2));
        assert_eq!(summary.record_count(DataType::Invoices), None);
        assert_eq!(summary.files[0].lines, 3);
        assert_eq!(summary.files[1].records, None);
    }

    #[test]
    fn test_to_markdown_lists_files() {
        let summary = PackageSummary {
            files: vec![FileSummary {
                name: "README.md".into(),
                lines: 12,
                records: None,
            }],
        };
        let table = summary.to_markdown();
        assert!(table.contains("| File | Lines | Records |"));
        assert!(table.contains("| README.md | 12 | - |"));
    }

    #[test]
    fn test_inspect_rejects_non_archive() {
        assert!(matches!(
            inspect_package(b"plain text"),
            Err(LiftError::Archive(_))
        ));
    }
}
