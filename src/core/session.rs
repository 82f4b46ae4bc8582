use crate::core::cascade::{CascadeController, CascadeOutcome};
use crate::core::compliance;
use crate::domain::model::{AttemptOutcome, AuditOutcome, AuditPolicy};
use crate::domain::ports::AnalysisProvider;

/// One audit per uploaded document: run the cascade, then evaluate the policy
/// when financial data was found. Pure sequencing; no business logic of its
/// own.
pub struct AuditSession<P: AnalysisProvider> {
    provider: P,
    policy: AuditPolicy,
}

impl<P: AnalysisProvider> AuditSession<P> {
    pub fn new(provider: P, policy: AuditPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    pub async fn audit(&self, document: &[u8]) -> AuditOutcome {
        let mut cascade = CascadeController::new(&self.provider);
        let CascadeOutcome { record, trail } =
            cascade.run(document, &self.policy.model_cascade).await;

        if !record.total_found {
            let rate_limited = trail
                .iter()
                .any(|attempt| matches!(attempt.outcome, AttemptOutcome::RateLimited { .. }));
            if rate_limited {
                tracing::warn!("cascade exhausted while the service was rate limiting");
                return AuditOutcome::RateLimited { trail };
            }
            tracing::info!("no financial data could be extracted from the document");
            return AuditOutcome::NoDataExtracted { trail };
        }

        let verdict = compliance::evaluate(&record, self.policy.cap, &self.policy.prohibited_terms);
        AuditOutcome::Verdict { verdict, trail }
    }
}
