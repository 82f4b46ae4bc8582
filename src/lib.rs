pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::AuditCli;

pub use adapters::document_intelligence::DocumentIntelligenceClient;
pub use config::policy::PolicyConfig;
pub use core::{cascade::CascadeController, session::AuditSession};
pub use domain::model::{AuditOutcome, AuditPolicy, ComplianceVerdict, Violation};
pub use domain::ports::AnalysisProvider;
pub use utils::error::{AuditError, Result};
