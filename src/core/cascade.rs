use crate::core::resolver;
use crate::domain::model::{AttemptOutcome, CanonicalRecord, ModelAttempt};
use crate::domain::ports::AnalysisProvider;

/// Where a cascade run currently stands. Kept explicit so the attempt trail
/// is a first-class artifact rather than a side effect of control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeState {
    NotStarted,
    Trying(String),
    Succeeded,
    Exhausted,
}

/// Result of one cascade run: the winning record (or an empty one when every
/// model was exhausted) plus the full attempt trail.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub record: CanonicalRecord,
    pub trail: Vec<ModelAttempt>,
}

/// Drives the analysis service across an ordered list of candidate models,
/// stopping at the first one that yields a usable positive total.
pub struct CascadeController<'a, P: AnalysisProvider> {
    provider: &'a P,
    state: CascadeState,
}

impl<'a, P: AnalysisProvider> CascadeController<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            state: CascadeState::NotStarted,
        }
    }

    pub fn state(&self) -> &CascadeState {
        &self.state
    }

    /// Tries each model in order. Service failures never abort the run; they
    /// are downgraded to trail entries and the next model is tried. Rate
    /// limiting is recorded as its own outcome so the session can surface a
    /// retry-later condition.
    pub async fn run(&mut self, document: &[u8], model_ids: &[String]) -> CascadeOutcome {
        let mut trail = Vec::with_capacity(model_ids.len());

        for model_id in model_ids {
            self.state = CascadeState::Trying(model_id.clone());
            tracing::debug!("trying analysis model: {}", model_id);

            let analysis = match self.provider.analyze(document, model_id).await {
                Ok(result) => result,
                Err(error) if error.is_rate_limited() => {
                    tracing::warn!("model {} rate limited: {}", model_id, error);
                    trail.push(ModelAttempt {
                        model_id: model_id.clone(),
                        outcome: AttemptOutcome::RateLimited {
                            reason: error.to_string(),
                        },
                    });
                    continue;
                }
                Err(error) => {
                    tracing::warn!("model {} unavailable: {}", model_id, error);
                    trail.push(ModelAttempt {
                        model_id: model_id.clone(),
                        outcome: AttemptOutcome::Unavailable {
                            reason: error.to_string(),
                        },
                    });
                    continue;
                }
            };

            let record = resolver::resolve(&analysis);
            if record.total_found {
                tracing::info!(
                    "model {} produced a usable total: {:.2}",
                    model_id,
                    record.total_amount
                );
                trail.push(ModelAttempt {
                    model_id: model_id.clone(),
                    outcome: AttemptOutcome::Success(record.clone()),
                });
                self.state = CascadeState::Succeeded;
                return CascadeOutcome { record, trail };
            }

            tracing::debug!("model {} returned no usable total", model_id);
            trail.push(ModelAttempt {
                model_id: model_id.clone(),
                outcome: AttemptOutcome::NoUsableTotal,
            });
        }

        self.state = CascadeState::Exhausted;
        CascadeOutcome {
            record: CanonicalRecord::empty(),
            trail,
        }
    }
}
