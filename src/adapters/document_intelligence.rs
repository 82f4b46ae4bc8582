use crate::domain::model::{AnalysisResult, RawDocument, RawField};
use crate::domain::ports::AnalysisProvider;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "operation-location";

const DEFAULT_API_VERSION: &str = "2024-11-30";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_POLLS: u32 = 60;

/// HTTP client for a Document Intelligence style analysis service.
///
/// `analyze` submits the document bytes, then polls the operation returned in
/// the `Operation-Location` header until the analysis settles. Construction
/// fails fast when the endpoint or key is missing, before any document is
/// accepted.
#[derive(Debug)]
pub struct DocumentIntelligenceClient {
    endpoint: String,
    key: String,
    api_version: String,
    poll_interval: Duration,
    max_polls: u32,
    client: Client,
}

impl DocumentIntelligenceClient {
    pub fn new(endpoint: &str, key: &str) -> Result<Self> {
        validate_url("AZURE_ENDPOINT", endpoint)?;
        validate_non_empty_string("AZURE_KEY", key)?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_polls: DEFAULT_MAX_POLLS,
            client: Client::new(),
        })
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    fn analyze_url(&self, model_id: &str) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.endpoint, model_id, self.api_version
        )
    }

    async fn submit(&self, document: &[u8], model_id: &str) -> Result<String> {
        let response = self
            .client
            .post(self.analyze_url(model_id))
            .header(KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(document.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limited(&response));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AuditError::ModelUnavailable {
                model_id: model_id.to_string(),
                reason: service_message(response).await,
            });
        }
        if !(status == StatusCode::ACCEPTED || status.is_success()) {
            return Err(AuditError::Service {
                code: status.as_u16().to_string(),
                message: service_message(response).await,
            });
        }

        response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .ok_or_else(|| AuditError::Service {
                code: status.as_u16().to_string(),
                message: "response did not include an operation-location header".to_string(),
            })
    }

    async fn poll(&self, operation_url: &str, model_id: &str) -> Result<AnalysisResult> {
        for _ in 0..self.max_polls {
            let response = self
                .client
                .get(operation_url)
                .header(KEY_HEADER, &self.key)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(rate_limited(&response));
            }
            if !status.is_success() {
                return Err(AuditError::Service {
                    code: status.as_u16().to_string(),
                    message: service_message(response).await,
                });
            }

            let body: serde_json::Value = response.json().await?;
            match body.get("status").and_then(|status| status.as_str()) {
                Some("succeeded") => return Ok(parse_analyze_result(body.get("analyzeResult"))),
                Some("failed") => {
                    let reason = body
                        .pointer("/error/message")
                        .and_then(|message| message.as_str())
                        .unwrap_or("analysis failed")
                        .to_string();
                    return Err(AuditError::ModelUnavailable {
                        model_id: model_id.to_string(),
                        reason,
                    });
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }

        Err(AuditError::ModelUnavailable {
            model_id: model_id.to_string(),
            reason: format!("analysis did not complete within {} polls", self.max_polls),
        })
    }
}

#[async_trait]
impl AnalysisProvider for DocumentIntelligenceClient {
    /// The request body is rebuilt from the shared byte buffer on every call,
    /// so repeated cascade attempts always read the document from the start.
    async fn analyze(&self, document: &[u8], model_id: &str) -> Result<AnalysisResult> {
        tracing::debug!("submitting document to model {}", model_id);
        let operation_url = self.submit(document, model_id).await?;

        tracing::debug!("polling analysis operation: {}", operation_url);
        self.poll(&operation_url, model_id).await
    }
}

fn rate_limited(response: &Response) -> AuditError {
    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok());

    AuditError::RateLimited { retry_after_secs }
}

async fn service_message(response: Response) -> String {
    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(_) => return "no error detail returned by the service".to_string(),
    };

    body.pointer("/error/message")
        .and_then(|message| message.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Maps the service's field encoding onto the tagged domain representation.
fn parse_analyze_result(value: Option<&serde_json::Value>) -> AnalysisResult {
    let documents = value
        .and_then(|result| result.get("documents"))
        .and_then(|documents| documents.as_array())
        .map(|documents| documents.iter().map(parse_document).collect())
        .unwrap_or_default();

    AnalysisResult { documents }
}

fn parse_document(value: &serde_json::Value) -> RawDocument {
    let doc_type = value
        .get("docType")
        .and_then(|doc_type| doc_type.as_str())
        .map(str::to_string);
    let fields = value
        .get("fields")
        .and_then(|fields| fields.as_object())
        .map(|fields| {
            fields
                .iter()
                .map(|(name, field)| (name.clone(), parse_field(field)))
                .collect()
        })
        .unwrap_or_default();

    RawDocument { doc_type, fields }
}

fn parse_field(value: &serde_json::Value) -> RawField {
    if let Some(number) = value.get("valueNumber").and_then(|number| number.as_f64()) {
        return RawField::Number(number);
    }
    if let Some(currency) = value.get("valueCurrency") {
        let amount = currency
            .get("amount")
            .and_then(|amount| amount.as_f64())
            .unwrap_or(0.0);
        let code = currency
            .get("currencyCode")
            .and_then(|code| code.as_str())
            .map(str::to_string);
        return RawField::Currency { amount, code };
    }
    if let Some(text) = value.get("valueString").and_then(|text| text.as_str()) {
        return RawField::Text(text.to_string());
    }
    if let Some(items) = value.get("valueArray").and_then(|items| items.as_array()) {
        return RawField::Array(items.iter().map(parse_field).collect());
    }
    if let Some(object) = value.get("valueObject").and_then(|object| object.as_object()) {
        return RawField::Object(
            object
                .iter()
                .map(|(name, field)| (name.clone(), parse_field(field)))
                .collect(),
        );
    }

    // Unknown encodings degrade to the field's recognized text content.
    RawField::Text(
        value
            .get("content")
            .and_then(|content| content.as_str())
            .unwrap_or_default()
            .to_string(),
    )
}
