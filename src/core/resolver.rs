use crate::domain::model::{AnalysisResult, CanonicalRecord, RawDocument, RawField};

/// Field-name aliases recognized for the document total, in priority order.
const TOTAL_ALIASES: [&str; 4] = ["Total", "TotalAmount", "AmountDue", "TotalValue"];

/// Field-name aliases recognized for a line-item description, in priority order.
const DESCRIPTION_ALIASES: [&str; 3] = ["Description", "Content", "ProductCode"];

const ITEMS_FIELD: &str = "Items";

/// Normalizes one raw analysis result into a model-agnostic record.
///
/// Never fails: missing or malformed structure degrades to `total_found =
/// false` and an empty item list.
pub fn resolve(result: &AnalysisResult) -> CanonicalRecord {
    let mut record = CanonicalRecord::empty();

    for document in &result.documents {
        if let Some(amount) = document_total(document) {
            // Later documents overwrite earlier ones; totals are never summed.
            record.total_amount = amount;
            record.total_found = true;
        }

        if let Some(RawField::Array(items)) = document.fields.get(ITEMS_FIELD) {
            for item in items {
                record.item_descriptions.push(item_description(item));
            }
        }
    }

    record
}

/// The first *present* alias wins and blocks later aliases, even when its
/// value turns out to be non-positive or non-numeric.
fn document_total(document: &RawDocument) -> Option<f64> {
    let field = TOTAL_ALIASES
        .iter()
        .find_map(|alias| document.fields.get(*alias))?;

    field.numeric_value().filter(|amount| *amount > 0.0)
}

fn item_description(item: &RawField) -> String {
    let description = match item {
        RawField::Object(fields) => DESCRIPTION_ALIASES
            .iter()
            .find_map(|alias| fields.get(*alias))
            .map(|field| field.display_string())
            .unwrap_or_default(),
        RawField::Text(text) => text.clone(),
        other => other.display_string(),
    };

    description.to_lowercase()
}
