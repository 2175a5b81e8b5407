/// Incremental builder for plain Markdown documents.
///
/// Every block is terminated by a blank line except list items, which are
/// kept together until the list is closed by the next block.
#[derive(Debug, Default, Clone)]
pub struct MarkdownDoc {
    out: String,
    in_list: bool,
}

impl MarkdownDoc {
    pub fn new(title: &str) -> Self {
        let mut doc = Self::default();
        doc.heading(1, title);
        doc
    }

    /// Append a heading of the given level (clamped to 1..=6).
    pub fn heading(&mut self, level: usize, text: &str) -> &mut Self {
        self.close_list();
        let hashes = "#".repeat(level.clamp(1, 6));
        self.out.push_str(&format!("{hashes} {text}\n\n"));
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.close_list();
        self.out.push_str(text);
        self.out.push_str("\n\n");
        self
    }

    /// Append a numbered list. Numbering restarts at 1 for every call.
    pub fn numbered<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.close_list();
        for (i, item) in items.iter().enumerate() {
            self.out.push_str(&format!("{}. {}\n", i + 1, item.as_ref()));
        }
        self.in_list = true;
        self
    }

    /// Append a numbered item continuing an existing list, with optional
    /// indented sub-bullets.
    pub fn numbered_item<S: AsRef<str>>(&mut self, number: usize, text: &str, sub: &[S]) -> &mut Self {
        self.out.push_str(&format!("{number}. {text}\n"));
        for line in sub {
            self.out.push_str(&format!("   - {}\n", line.as_ref()));
        }
        self.in_list = true;
        self
    }

    pub fn bullets<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.close_list();
        for item in items {
            self.out.push_str(&format!("- {}\n", item.as_ref()));
        }
        self.in_list = true;
        self
    }

    /// Finish the document. Trailing whitespace is normalized to one newline.
    pub fn build(mut self) -> String {
        self.close_list();
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        self.out
    }

    fn close_list(&mut self) {
        if self.in_list {
            self.out.push('\n');
            self.in_list = false;
        }
    }
}

/// Generate a Markdown table from headers and rows.
///
/// Pipes in cell content are escaped to prevent breaking the table structure.
pub fn generate_markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();

    let header_cells: Vec<String> = headers.iter().map(|h| escape_pipe(h)).collect();
    lines.push(format!("| {} |", header_cells.join(" | ")));

    let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
    lines.push(format!("| {} |", separators.join(" | ")));

    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_pipe(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}
