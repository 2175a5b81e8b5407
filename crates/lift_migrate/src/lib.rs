// Export pipeline: synthetic records -> CSV + instructions -> zip package

pub mod download;
pub mod inspect;
pub mod instructions;
pub mod pipeline;
pub mod records;

pub use download::{DownloadHandle, DownloadStore};
pub use inspect::{FileSummary, PackageSummary, inspect_package};
pub use instructions::generate_instructions;
pub use pipeline::{
    MigrationPackage, MigrationRequest, MigrationRunner, MigrationStatus, Stage, archive_file_name,
};
pub use records::{Customer, Invoice, InvoiceStatus, Money, RecordGenerator};
