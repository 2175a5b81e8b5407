use chrono::{NaiveDate, Utc};
use lift_core::{DataType, LiftConfig, LiftError, TargetPlatform, WizardState, WizardStep};
use lift_docs::{ArchiveEntry, build_archive, records_to_csv};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::download::{DownloadHandle, DownloadStore};
use crate::instructions::{INSTRUCTIONS_FILE, generate_instructions};
use crate::records::{Customer, Invoice, RecordGenerator};

/// Name of the archive produced for `platform`.
pub fn archive_file_name(platform: TargetPlatform) -> String {
    format!("quickbooks-migration-{platform}.zip")
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    pub selected: BTreeSet<DataType>,
    pub platform: TargetPlatform,
}

impl MigrationRequest {
    pub fn new(selected: impl IntoIterator<Item = DataType>, platform: TargetPlatform) -> Self {
        Self {
            selected: selected.into_iter().collect(),
            platform,
        }
    }

    /// Build a request from the selections collected by the wizard.
    pub fn from_wizard(state: &WizardState) -> Result<Self, LiftError> {
        let platform = state.target_platform().ok_or_else(|| LiftError::Guard {
            step: WizardStep::PlatformSelection,
            reason: "Choose a destination platform.".into(),
        })?;
        Ok(Self::new(state.selected_data().iter().copied(), platform))
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preparing,
    Connecting,
    Extracting,
    Processing,
    Generating,
    Packaging,
    Complete,
    Error,
}

impl Stage {
    pub fn progress(self) -> u8 {
        match self {
            Self::Preparing | Self::Error => 0,
            Self::Connecting => 10,
            Self::Extracting => 30,
            Self::Processing => 60,
            Self::Generating => 80,
            Self::Packaging => 95,
            Self::Complete => 100,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Preparing => "Preparing migration...",
            Self::Connecting => "Connecting to QuickBooks...",
            Self::Extracting => "Extracting data from QuickBooks...",
            Self::Processing => "Processing and formatting data...",
            Self::Generating => "Generating CSV files...",
            Self::Packaging => "Creating migration package...",
            Self::Complete => "Migration package ready!",
            Self::Error => "An error occurred during migration. Please try again.",
        }
    }
}

/// Snapshot reported to the progress callback after every stage change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationStatus {
    pub stage: Stage,
    pub progress: u8,
    pub is_complete: bool,
    pub is_error: bool,
    pub message: String,
}

impl MigrationStatus {
    fn at(stage: Stage) -> Self {
        Self {
            stage,
            progress: stage.progress(),
            is_complete: false,
            is_error: stage == Stage::Error,
            message: stage.message().to_string(),
        }
    }

    fn ready() -> Self {
        Self {
            is_complete: true,
            message: "Migration package ready for download!".into(),
            ..Self::at(Stage::Complete)
        }
    }
}

impl Default for MigrationStatus {
    fn default() -> Self {
        Self::at(Stage::Preparing)
    }
}

// ---------------------------------------------------------------------------
// Package assembly
// ---------------------------------------------------------------------------

/// Records pulled from the (simulated) source system for one run.
#[derive(Debug, Default)]
pub struct ExtractedRecords {
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
}

/// Everything that goes into the archive, before it is zipped.
#[derive(Debug, Clone)]
pub struct MigrationPackage {
    pub file_name: String,
    pub files: Vec<ArchiveEntry>,
    pub record_counts: BTreeMap<DataType, usize>,
}

/// Generate the records a request asks for.
///
/// Invoices are drawn against the customers generated in the same run; when
/// customers were not selected the generator falls back to a private set.
pub fn extract_records<R: rand::Rng>(
    request: &MigrationRequest,
    config: &LiftConfig,
    generator: &mut RecordGenerator<R>,
) -> ExtractedRecords {
    let mut records = ExtractedRecords::default();
    if request.selected.contains(&DataType::Customers) {
        records.customers = generator.generate_customers(config.customer_count);
    }
    if request.selected.contains(&DataType::Invoices) {
        records.invoices = generator.generate_invoices(config.invoice_count, &records.customers);
    }
    records
}

/// Format extracted records and the instructions into package files.
/// CSV files come first in record-type order, `README.md` is always last.
pub fn format_package(
    request: &MigrationRequest,
    records: &ExtractedRecords,
) -> Result<MigrationPackage, LiftError> {
    let mut files = Vec::new();
    let mut record_counts = BTreeMap::new();

    for data in &request.selected {
        let (csv, count) = match data {
            DataType::Customers => (records_to_csv(&records.customers), records.customers.len()),
            DataType::Invoices => (records_to_csv(&records.invoices), records.invoices.len()),
        };
        let csv = csv.map_err(|e| LiftError::Format(format!("{}: {e:#}", data.file_name())))?;
        files.push(ArchiveEntry::new(data.file_name(), csv));
        record_counts.insert(*data, count);
    }

    files.push(ArchiveEntry::new(
        INSTRUCTIONS_FILE,
        generate_instructions(request.platform, &request.selected),
    ));

    Ok(MigrationPackage {
        file_name: archive_file_name(request.platform),
        files,
        record_counts,
    })
}

/// Zip the package, enforcing the configured size limit.
pub fn pack(package: &MigrationPackage, max_bytes: u64) -> Result<Vec<u8>, LiftError> {
    let bytes =
        build_archive(&package.files).map_err(|e| LiftError::Archive(format!("{e:#}")))?;
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(LiftError::ArchiveTooLarge {
            size,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// MigrationRunner
// ---------------------------------------------------------------------------

/// Runs the export pipeline for the migration step.
///
/// One run at a time: `run` takes `&mut self`. The runner owns at most one
/// download handle and releases it when a new run starts or when dropped.
pub struct MigrationRunner {
    config: LiftConfig,
    store: Arc<DownloadStore>,
    seed: Option<u64>,
    today: Option<NaiveDate>,
    status: MigrationStatus,
    handle: Option<DownloadHandle>,
    last_request: Option<MigrationRequest>,
    record_counts: BTreeMap<DataType, usize>,
}

impl MigrationRunner {
    pub fn new(config: LiftConfig, store: Arc<DownloadStore>) -> Self {
        Self {
            config,
            store,
            seed: None,
            today: None,
            status: MigrationStatus::default(),
            handle: None,
            last_request: None,
            record_counts: BTreeMap::new(),
        }
    }

    /// Use a fixed RNG seed instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pin the reference date used for generated record dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &LiftConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LiftConfig {
        &mut self.config
    }

    pub fn status(&self) -> &MigrationStatus {
        &self.status
    }

    pub fn handle(&self) -> Option<&DownloadHandle> {
        self.handle.as_ref()
    }

    /// Record counts of the last successful run.
    pub fn record_counts(&self) -> &BTreeMap<DataType, usize> {
        &self.record_counts
    }

    /// Run the whole pipeline for `request`, reporting every stage change to
    /// `on_progress`. On failure the runner is left in the error status and
    /// [`retry`](Self::retry) reruns from scratch.
    pub async fn run<F>(
        &mut self,
        request: MigrationRequest,
        mut on_progress: F,
    ) -> Result<DownloadHandle, LiftError>
    where
        F: FnMut(&MigrationStatus),
    {
        self.release_handle();
        self.record_counts.clear();
        self.last_request = Some(request.clone());
        info!(
            platform = %request.platform,
            selected = ?request.selected,
            "starting migration"
        );

        match self.execute(&request, &mut on_progress).await {
            Ok((handle, counts)) => {
                self.handle = Some(handle.clone());
                self.record_counts = counts;
                self.update(MigrationStatus::ready(), &mut on_progress);
                info!("migration package ready: {}", handle.file_name());
                Ok(handle)
            }
            Err(e) => {
                error!("migration failed: {e}");
                self.update(MigrationStatus::at(Stage::Error), &mut on_progress);
                Err(e)
            }
        }
    }

    /// Rerun the last request from scratch.
    pub async fn retry<F>(&mut self, on_progress: F) -> Result<DownloadHandle, LiftError>
    where
        F: FnMut(&MigrationStatus),
    {
        let request = self
            .last_request
            .clone()
            .ok_or_else(|| LiftError::Internal("retry requested before any run".into()))?;
        self.run(request, on_progress).await
    }

    async fn execute<F>(
        &mut self,
        request: &MigrationRequest,
        on_progress: &mut F,
    ) -> Result<(DownloadHandle, BTreeMap<DataType, usize>), LiftError>
    where
        F: FnMut(&MigrationStatus),
    {
        self.advance(Stage::Connecting, on_progress).await;

        self.advance(Stage::Extracting, on_progress).await;
        let mut generator = self.generator();
        let records = extract_records(request, &self.config, &mut generator);
        debug!(
            customers = records.customers.len(),
            invoices = records.invoices.len(),
            "records extracted"
        );

        self.advance(Stage::Processing, on_progress).await;

        self.advance(Stage::Generating, on_progress).await;
        let package = format_package(request, &records)?;
        let counts = package.record_counts.clone();
        let file_name = package.file_name.clone();

        self.update(MigrationStatus::at(Stage::Packaging), on_progress);
        let limit = self.config.max_archive_bytes;
        let bytes = tokio::task::spawn_blocking(move || pack(&package, limit))
            .await
            .map_err(|e| LiftError::Archive(format!("archive task failed: {e}")))??;
        debug!(size = bytes.len(), "archive assembled");

        Ok((self.store.register(file_name, bytes), counts))
    }

    fn generator(&self) -> RecordGenerator<StdRng> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        RecordGenerator::new(rng, today)
            .with_tax_rate(self.config.tax_rate)
            .with_payment_terms(self.config.payment_terms_days)
            .with_fallback_customers(self.config.customer_count)
    }

    async fn advance<F>(&mut self, stage: Stage, on_progress: &mut F)
    where
        F: FnMut(&MigrationStatus),
    {
        self.update(MigrationStatus::at(stage), on_progress);
        if self.config.stage_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.stage_delay_ms)).await;
        }
    }

    fn update<F>(&mut self, status: MigrationStatus, on_progress: &mut F)
    where
        F: FnMut(&MigrationStatus),
    {
        debug!(stage = ?status.stage, progress = status.progress, "{}", status.message);
        on_progress(&status);
        self.status = status;
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.release(&handle);
        }
    }
}

impl Drop for MigrationRunner {
    fn drop(&mut self) {
        self.release_handle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_docs::read_archive;

    fn config() -> LiftConfig {
        LiftConfig {
            stage_delay_ms: 0,
            ..LiftConfig::default()
        }
    }

    fn generator() -> RecordGenerator<StdRng> {
        RecordGenerator::new(
            StdRng::seed_from_u64(17),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(
            archive_file_name(TargetPlatform::Airtable),
            "quickbooks-migration-airtable.zip"
        );
    }

    #[test]
    fn test_request_from_wizard_needs_platform() {
        let mut state = WizardState::new();
        state.toggle_data(DataType::Customers);
        assert!(MigrationRequest::from_wizard(&state).is_err());

        state.select_platform(TargetPlatform::Notion);
        let request = MigrationRequest::from_wizard(&state).unwrap();
        assert_eq!(request.platform, TargetPlatform::Notion);
        assert!(request.selected.contains(&DataType::Customers));
    }

    #[test]
    fn test_extract_skips_unselected_types() {
        let request = MigrationRequest::new([DataType::Invoices], TargetPlatform::Notion);
        let records = extract_records(&request, &config(), &mut generator());
        assert!(records.customers.is_empty());
        assert_eq!(records.invoices.len(), 50);
    }

    #[test]
    fn test_extract_links_invoices_to_same_run_customers() {
        let request = MigrationRequest::new(DataType::ALL, TargetPlatform::Notion);
        let records = extract_records(&request, &config(), &mut generator());
        assert_eq!(records.customers.len(), 25);
        for invoice in &records.invoices {
            assert!(
                records
                    .customers
                    .iter()
                    .any(|c| c.customer_id == invoice.customer_id)
            );
        }
    }

    #[test]
    fn test_format_package_file_order() {
        let request = MigrationRequest::new(DataType::ALL, TargetPlatform::Airtable);
        let records = extract_records(&request, &config(), &mut generator());
        let package = format_package(&request, &records).unwrap();

        let names: Vec<&str> = package.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["customers.csv", "invoices.csv", "README.md"]);
        assert_eq!(package.record_counts[&DataType::Customers], 25);
        assert_eq!(package.record_counts[&DataType::Invoices], 50);
        assert_eq!(package.file_name, "quickbooks-migration-airtable.zip");
    }

    #[test]
    fn test_empty_selection_packs_only_instructions() {
        let request = MigrationRequest::new(Vec::<DataType>::new(), TargetPlatform::Notion);
        let records = extract_records(&request, &config(), &mut generator());
        let package = format_package(&request, &records).unwrap();
        let bytes = pack(&package, u64::MAX).unwrap();

        let entries = read_archive(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "README.md");
    }

    #[test]
    fn test_pack_enforces_limit() {
        let request = MigrationRequest::new([DataType::Customers], TargetPlatform::Notion);
        let records = extract_records(&request, &config(), &mut generator());
        let package = format_package(&request, &records).unwrap();
        assert!(matches!(
            pack(&package, 16),
            Err(LiftError::ArchiveTooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn test_status_defaults_and_ready() {
        let status = MigrationStatus::default();
        assert_eq!(status.stage, Stage::Preparing);
        assert_eq!(status.message, "Preparing migration...");

        let ready = MigrationStatus::ready();
        assert!(ready.is_complete);
        assert!(!ready.is_error);
        assert_eq!(ready.progress, 100);

        let failed = MigrationStatus::at(Stage::Error);
        assert!(failed.is_error);
        assert_eq!(failed.progress, 0);
    }

    #[tokio::test]
    async fn test_run_reports_stages_in_order() {
        let store = Arc::new(DownloadStore::new());
        let mut runner = MigrationRunner::new(config(), Arc::clone(&store)).with_seed(1);
        let request = MigrationRequest::new([DataType::Customers], TargetPlatform::Notion);

        let mut seen = Vec::new();
        runner
            .run(request, |status| seen.push(status.progress))
            .await
            .unwrap();

        assert_eq!(seen, vec![10, 30, 60, 80, 95, 100]);
        assert!(runner.status().is_complete);
        assert_eq!(runner.record_counts()[&DataType::Customers], 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_between_stages() {
        let store = Arc::new(DownloadStore::new());
        let config = LiftConfig {
            stage_delay_ms: 1500,
            ..LiftConfig::default()
        };
        let mut runner = MigrationRunner::new(config, store).with_seed(2);
        let request = MigrationRequest::new([DataType::Invoices], TargetPlatform::Airtable);

        let started = tokio::time::Instant::now();
        runner.run(request, |_| {}).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(4 * 1500));
    }
}
