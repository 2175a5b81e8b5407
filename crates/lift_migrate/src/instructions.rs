use lift_core::{DataType, TargetPlatform};
use lift_docs::MarkdownDoc;
use std::collections::BTreeSet;

pub const SOURCE_SYSTEM: &str = "QuickBooks";
pub const INSTRUCTIONS_FILE: &str = "README.md";

/// Platform-specific wording for the import walkthrough.
struct PlatformGuide {
    setup: [&'static str; 2],
    create_table: &'static str,
    import_action: &'static str,
    review: &'static str,
    link_title: &'static str,
    link_steps: [&'static str; 3],
    guide_name: &'static str,
    guide_url: &'static str,
}

fn guide(platform: TargetPlatform) -> PlatformGuide {
    match platform {
        TargetPlatform::Notion => PlatformGuide {
            setup: [
                "Open Notion and create a new page",
                "Add a database by typing \"/database\" and selecting \"Table - Inline\"",
            ],
            create_table: "Create a new database called",
            import_action: "Click the \"...\" menu → Import → CSV",
            review: "Review and confirm the column types",
            link_title: "Create a relation column to link invoices to customers:",
            link_steps: [
                "Add a new property called \"Customer\"",
                "Set type to \"Relation\" and select your Customers database",
                "Use the Customer ID to manually link records",
            ],
            guide_name: "Notion Import Guide",
            guide_url: "https://www.notion.so/help/import-data",
        },
        TargetPlatform::Airtable => PlatformGuide {
            setup: [
                "Go to airtable.com and create a new base",
                "Delete the default table and create new ones",
            ],
            create_table: "Create a table called",
            import_action: "Click \"Create table\" → \"Import data\" → \"CSV file\"",
            review: "Review field types and adjust as needed",
            link_title: "Create a linked record field:",
            link_steps: [
                "Change the \"Customer ID\" field type to \"Link to another record\"",
                "Select your \"Customers\" table",
                "Airtable will automatically link records based on Customer ID",
            ],
            guide_name: "Airtable Import Guide",
            guide_url: "https://support.airtable.com/hc/en-us/articles/203313915",
        },
    }
}

fn overview(data: DataType) -> &'static str {
    match data {
        DataType::Customers => {
            "Contains customer information including names, contact details, and addresses"
        }
        DataType::Invoices => {
            "Contains invoice data with amounts, dates, and customer relationships"
        }
    }
}

/// Render the `README.md` shipped inside a migration package.
///
/// One import section is emitted per selected record type. When both types
/// are present the invoices section gains a final step that links invoices
/// back to customers on the destination platform.
pub fn generate_instructions(platform: TargetPlatform, selected: &BTreeSet<DataType>) -> String {
    let title = platform.title();
    let guide = guide(platform);

    let mut doc = MarkdownDoc::new(&format!("{title} Import Instructions"));
    doc.paragraph(&format!(
        "This package contains your {SOURCE_SYSTEM} data exported for {title}."
    ));
    doc.heading(2, &format!("Import Steps for {title}:"));
    doc.numbered(&guide.setup);

    for data in selected {
        let label = data.label();
        doc.heading(3, &format!("Import {label}:"));
        doc.numbered(&[
            format!("{} \"{label}\"", guide.create_table),
            guide.import_action.to_string(),
            format!("Upload the {} file", data.file_name()),
            guide.review.to_string(),
        ]);
        if *data == DataType::Invoices && selected.contains(&DataType::Customers) {
            doc.numbered_item(5, guide.link_title, &guide.link_steps);
        }
    }

    doc.heading(2, "Data Overview:");
    let files: Vec<String> = selected
        .iter()
        .map(|data| format!("**{}**: {}", data.file_name(), overview(*data)))
        .collect();
    doc.bullets(&files);

    doc.heading(2, "Support:");
    doc.paragraph("If you need help with the import process, refer to the official documentation:");
    doc.bullets(&[format!("{}: {}", guide.guide_name, guide.guide_url)]);

    doc.build()
}
