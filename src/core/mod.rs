pub mod cascade;
pub mod compliance;
pub mod resolver;
pub mod session;

pub use crate::domain::model::{
    AnalysisResult, AttemptOutcome, AuditOutcome, AuditPolicy, CanonicalRecord, ComplianceVerdict,
    ModelAttempt, Violation,
};
pub use crate::domain::ports::AnalysisProvider;
pub use crate::utils::error::Result;
