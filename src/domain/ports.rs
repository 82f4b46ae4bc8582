use crate::domain::model::AnalysisResult;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Boundary to the external document-analysis service.
///
/// The same byte buffer is reused across cascade attempts, so implementations
/// must read the document from the start on every call.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, document: &[u8], model_id: &str) -> Result<AnalysisResult>;
}
