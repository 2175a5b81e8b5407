use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error_handler::LiftError;

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// Record types that can be exported. Ordering drives file order in the
/// package (customers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Customers,
    Invoices,
}

impl DataType {
    pub const ALL: [DataType; 2] = [DataType::Customers, DataType::Invoices];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Invoices => "invoices",
        }
    }

    /// Human-facing label, e.g. `Customers`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Customers => "Customers",
            Self::Invoices => "Invoices",
        }
    }

    /// File name of this record type inside the migration package.
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customers" => Ok(Self::Customers),
            "invoices" => Ok(Self::Invoices),
            other => Err(format!("unknown data type '{other}' (expected customers or invoices)")),
        }
    }
}

/// Destination platforms a package can be prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Notion,
    Airtable,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 2] = [TargetPlatform::Notion, TargetPlatform::Airtable];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notion => "notion",
            Self::Airtable => "airtable",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Notion => "Notion",
            Self::Airtable => "Airtable",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Notion => {
                "Perfect for teams who want a flexible workspace with databases, notes, and collaboration features."
            }
            Self::Airtable => {
                "Ideal for businesses that need powerful database features with spreadsheet-like interface."
            }
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notion" => Ok(Self::Notion),
            "airtable" => Ok(Self::Airtable),
            other => Err(format!("unknown platform '{other}' (expected notion or airtable)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    Welcome,
    Auth,
    DataSelection,
    PlatformSelection,
    Migration,
    Completion,
}

impl WizardStep {
    pub const ORDER: [WizardStep; 6] = [
        WizardStep::Welcome,
        WizardStep::Auth,
        WizardStep::DataSelection,
        WizardStep::PlatformSelection,
        WizardStep::Migration,
        WizardStep::Completion,
    ];

    pub fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Option<Self> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Auth => "auth",
            Self::DataSelection => "data-selection",
            Self::PlatformSelection => "platform-selection",
            Self::Migration => "migration",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the export pipeline stands for the current visit to the migration
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MigrationPhase {
    #[default]
    Idle,
    Running,
    Complete,
    Failed,
}

// ---------------------------------------------------------------------------
// WizardState
// ---------------------------------------------------------------------------

/// Explicit wizard state, passed to whoever drives the steps.
///
/// Transitions only move between adjacent steps. Forward moves are guarded
/// by the selections each step collects; nothing here is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardState {
    step: WizardStep,
    selected_data: BTreeSet<DataType>,
    target_platform: Option<TargetPlatform>,
    is_authenticated: bool,
    migration: MigrationPhase,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_data(&self) -> &BTreeSet<DataType> {
        &self.selected_data
    }

    pub fn target_platform(&self) -> Option<TargetPlatform> {
        self.target_platform
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn migration_phase(&self) -> MigrationPhase {
        self.migration
    }

    /// `(position, total)` for a progress bar that skips the welcome screen.
    pub fn progress(&self) -> (usize, usize) {
        (self.step.index(), WizardStep::ORDER.len() - 1)
    }

    // -- Selections ---------------------------------------------------------

    pub fn authenticate(&mut self) {
        self.is_authenticated = true;
    }

    /// Flip a record type in or out of the selection. Returns whether it is
    /// selected afterwards.
    pub fn toggle_data(&mut self, data: DataType) -> bool {
        if !self.selected_data.remove(&data) {
            self.selected_data.insert(data);
            true
        } else {
            false
        }
    }

    pub fn select_data(&mut self, data: impl IntoIterator<Item = DataType>) {
        self.selected_data = data.into_iter().collect();
    }

    pub fn select_platform(&mut self, platform: TargetPlatform) {
        self.target_platform = Some(platform);
    }

    // -- Migration ----------------------------------------------------------

    pub fn begin_migration(&mut self) {
        self.migration = MigrationPhase::Running;
    }

    pub fn finish_migration(&mut self, succeeded: bool) {
        self.migration = if succeeded {
            MigrationPhase::Complete
        } else {
            MigrationPhase::Failed
        };
    }

    // -- Transitions --------------------------------------------------------

    /// Reason the current step cannot be left forward, if any.
    pub fn forward_blocker(&self) -> Option<&'static str> {
        match self.step {
            WizardStep::Auth if !self.is_authenticated => {
                Some("Connect to QuickBooks before continuing.")
            }
            WizardStep::DataSelection if self.selected_data.is_empty() => {
                Some("Select at least one data type to migrate.")
            }
            WizardStep::PlatformSelection if self.target_platform.is_none() => {
                Some("Choose a destination platform.")
            }
            WizardStep::Migration if self.migration != MigrationPhase::Complete => {
                Some("Wait for the migration package to be ready.")
            }
            WizardStep::Completion => Some("This is the last step."),
            _ => None,
        }
    }

    pub fn can_advance(&self) -> bool {
        self.forward_blocker().is_none()
    }

    /// Move to the next step. Entering the migration step resets the
    /// migration phase so the caller runs the pipeline once.
    pub fn next(&mut self) -> Result<WizardStep, LiftError> {
        if let Some(reason) = self.forward_blocker() {
            return Err(self.guard(reason));
        }
        let next = self
            .step
            .next()
            .ok_or_else(|| self.guard("This is the last step."))?;
        self.enter(next);
        Ok(next)
    }

    /// Move to the previous step. Refused on the first step and while a
    /// migration is running.
    pub fn back(&mut self) -> Result<WizardStep, LiftError> {
        if self.step == WizardStep::Migration && self.migration == MigrationPhase::Running {
            return Err(self.guard("The migration is still running."));
        }
        let previous = self
            .step
            .previous()
            .ok_or_else(|| self.guard("This is the first step."))?;
        self.enter(previous);
        Ok(previous)
    }

    /// Start over from the welcome screen, keeping selections and the
    /// connection.
    pub fn restart(&mut self) {
        self.step = WizardStep::Welcome;
        self.migration = MigrationPhase::Idle;
    }

    fn enter(&mut self, step: WizardStep) {
        if step == WizardStep::Migration {
            self.migration = MigrationPhase::Idle;
        }
        self.step = step;
    }

    fn guard(&self, reason: &str) -> LiftError {
        LiftError::Guard {
            step: self.step,
            reason: reason.to_string(),
        }
    }
}
