use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize a slice of uniformly-shaped records into CSV text.
///
/// The header line comes from the first record's field names, in declaration
/// order (serde `rename`s apply). A value is quoted only when it contains a
/// comma, a double quote or a line break; inner quotes are doubled.
///
/// An empty slice produces an empty string.
pub fn records_to_csv<T: Serialize>(records: &[T]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    for (index, record) in records.iter().enumerate() {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write CSV record {}", index + 1))?;
    }

    finish(writer)
}

/// Parse a CSV string into headers and rows.
///
/// The first record is treated as the header row. Empty input yields no
/// headers and no rows.
pub fn parse_csv(input: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    if input.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok((headers, rows))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output contained invalid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Contact {
        #[serde(rename = "Contact ID")]
        id: String,
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Note")]
        note: String,
        #[serde(rename = "ZIP")]
        zip: u32,
    }

    fn contact(id: &str, name: &str, note: &str) -> Contact {
        Contact {
            id: id.into(),
            name: name.into(),
            note: note.into(),
            zip: 10001,
        }
    }

    #[test]
    fn test_records_to_csv_header_follows_field_order() {
        let csv_text = records_to_csv(&[contact("C-1", "Alice", "vip")]).unwrap();
        let first = csv_text.lines().next().unwrap();
        assert_eq!(first, "Contact ID,Name,Note,ZIP");
    }

    #[test]
    fn test_records_to_csv_line_count_is_records_plus_one() {
        let records: Vec<Contact> = (1..=7)
            .map(|i| contact(&format!("C-{i}"), "Bob", "plain"))
            .collect();
        let csv_text = records_to_csv(&records).unwrap();
        assert_eq!(csv_text.lines().count(), records.len() + 1);
    }

    #[test]
    fn test_records_to_csv_empty_input_is_empty_output() {
        let records: Vec<Contact> = vec![];
        assert_eq!(records_to_csv(&records).unwrap(), "");
    }

    #[test]
    fn test_records_to_csv_plain_values_are_not_quoted() {
        let csv_text = records_to_csv(&[contact("C-1", "Tech Solutions Inc", "ok")]).unwrap();
        assert!(csv_text.contains("C-1,Tech Solutions Inc,ok,10001"));
    }

    #[test]
    fn test_records_to_csv_quotes_commas_and_doubles_quotes() {
        let csv_text =
            records_to_csv(&[contact("C-1", "Smith, John", "said \"hi\"")]).unwrap();
        assert!(csv_text.contains("\"Smith, John\""));
        assert!(csv_text.contains("\"said \"\"hi\"\"\""));
    }

    #[test]
    fn test_records_to_csv_tricky_values_survive_reparse() {
        let records = vec![
            contact("C-1", "Smith, John", "plain"),
            contact("C-2", "The \"Best\" Co", "a, \"b\", c"),
        ];
        let csv_text = records_to_csv(&records).unwrap();
        let (headers, rows) = parse_csv(&csv_text).unwrap();

        assert_eq!(headers, vec!["Contact ID", "Name", "Note", "ZIP"]);
        assert_eq!(rows[0][1], "Smith, John");
        assert_eq!(rows[1][1], "The \"Best\" Co");
        assert_eq!(rows[1][2], "a, \"b\", c");
    }

    #[test]
    fn test_parse_csv_empty_input() {
        let (headers, rows) = parse_csv("").unwrap();
        assert!(headers.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_csv_with_quotes() {
        let input = "Name,Value\n\"Hello, World\",42\n";
        let (headers, rows) = parse_csv(input).unwrap();
        assert_eq!(headers, vec!["Name", "Value"]);
        assert_eq!(rows[0][0], "Hello, World");
    }
}
