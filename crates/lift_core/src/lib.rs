pub mod config;
pub mod error_handler;
pub mod logging;
pub mod wizard;

pub use config::LiftConfig;
pub use error_handler::{ErrorCategory, LiftError};
pub use wizard::{DataType, MigrationPhase, TargetPlatform, WizardState, WizardStep};
