use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One field value as returned by an analysis model.
///
/// Field shapes vary per model and no shared schema is guaranteed, so every
/// consumer has to tolerate any variant in any position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawField {
    Number(f64),
    Currency { amount: f64, code: Option<String> },
    Text(String),
    Array(Vec<RawField>),
    Object(HashMap<String, RawField>),
}

impl RawField {
    /// Numeric value of the field: a direct number first, the amount of a
    /// currency-typed value second.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            RawField::Number(number) => Some(*number),
            RawField::Currency { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Best-effort string rendering, used when a line item carries no
    /// recognizable description field.
    pub fn display_string(&self) -> String {
        match self {
            RawField::Text(text) => text.clone(),
            RawField::Number(number) => format!("{}", number),
            RawField::Currency { amount, code } => match code {
                Some(code) => format!("{} {}", amount, code),
                None => format!("{}", amount),
            },
            RawField::Array(items) => items
                .iter()
                .map(RawField::display_string)
                .collect::<Vec<_>>()
                .join(", "),
            RawField::Object(fields) => {
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort();
                names
                    .into_iter()
                    .map(|name| format!("{}={}", name, fields[name].display_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }
}

/// One recognized document inside an analysis result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub doc_type: Option<String>,
    pub fields: HashMap<String, RawField>,
}

/// Raw output of one analysis model for one uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub documents: Vec<RawDocument>,
}

/// Model-agnostic financial data extracted from an analysis result.
///
/// `total_found` is true iff a positive total was located under one of the
/// recognized field aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub total_amount: f64,
    pub total_found: bool,
    pub item_descriptions: Vec<String>,
}

impl CanonicalRecord {
    pub fn empty() -> Self {
        Self {
            total_amount: 0.0,
            total_found: false,
            item_descriptions: Vec::new(),
        }
    }
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Why a model attempt did or did not produce usable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    Success(CanonicalRecord),
    Unavailable { reason: String },
    RateLimited { reason: String },
    NoUsableTotal,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success(record) => {
                write!(f, "succeeded (total {:.2})", record.total_amount)
            }
            AttemptOutcome::Unavailable { reason } => write!(f, "unavailable: {}", reason),
            AttemptOutcome::RateLimited { reason } => write!(f, "rate limited: {}", reason),
            AttemptOutcome::NoUsableTotal => write!(f, "no usable total"),
        }
    }
}

/// One entry in the per-document attempt trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAttempt {
    pub model_id: String,
    pub outcome: AttemptOutcome,
}

/// A single compliance rule breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    CapExceeded { amount: f64, cap: f64 },
    ProhibitedItem { description: String, term: String },
    TotalNotFound,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CapExceeded { amount, cap } => write!(
                f,
                "spending of {:.2} exceeds the {:.2} cap",
                amount, cap
            ),
            Violation::ProhibitedItem { description, term } => write!(
                f,
                "prohibited item detected: '{}' (matched term '{}')",
                description, term
            ),
            Violation::TotalNotFound => {
                write!(f, "could not locate a total amount in the document")
            }
        }
    }
}

/// Result of evaluating the expense policy against one canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub is_compliant: bool,
    pub total_amount: f64,
    pub violations: Vec<Violation>,
}

/// Final result of one audit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditOutcome {
    /// Every configured model was tried and none produced a usable total.
    NoDataExtracted { trail: Vec<ModelAttempt> },
    /// The cascade was exhausted and at least one attempt hit service rate
    /// limiting; the document should be retried after a cooldown.
    RateLimited { trail: Vec<ModelAttempt> },
    /// A model produced financial data and the policy was evaluated.
    Verdict {
        verdict: ComplianceVerdict,
        trail: Vec<ModelAttempt>,
    },
}

impl AuditOutcome {
    pub fn trail(&self) -> &[ModelAttempt] {
        match self {
            AuditOutcome::NoDataExtracted { trail } => trail,
            AuditOutcome::RateLimited { trail } => trail,
            AuditOutcome::Verdict { trail, .. } => trail,
        }
    }

    /// The model whose record the verdict was computed from, if any.
    pub fn winning_model(&self) -> Option<&str> {
        self.trail()
            .iter()
            .find(|attempt| matches!(attempt.outcome, AttemptOutcome::Success(_)))
            .map(|attempt| attempt.model_id.as_str())
    }
}

pub const DEFAULT_CAP: f64 = 80.0;

pub const DEFAULT_PROHIBITED_TERMS: [&str; 11] = [
    "cerveja",
    "chopp",
    "vinho",
    "caipirinha",
    "vodka",
    "whisky",
    "margarita",
    "bebida alcoolica",
    "beer",
    "wine",
    "alcohol",
];

/// Custom expense model first, then the general receipt and invoice models as
/// a recovery ladder of decreasing specificity.
pub const DEFAULT_MODEL_CASCADE: [&str; 3] =
    ["expense-custom", "prebuilt-receipt", "prebuilt-invoice"];

/// Effective audit policy: spending cap, prohibited substrings and the order
/// in which analysis models are tried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPolicy {
    pub cap: f64,
    pub prohibited_terms: Vec<String>,
    pub model_cascade: Vec<String>,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            prohibited_terms: DEFAULT_PROHIBITED_TERMS
                .iter()
                .map(|term| term.to_string())
                .collect(),
            model_cascade: DEFAULT_MODEL_CASCADE
                .iter()
                .map(|model| model.to_string())
                .collect(),
        }
    }
}
