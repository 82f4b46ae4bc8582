use crate::domain::model::{CanonicalRecord, ComplianceVerdict, Violation};

/// Applies the expense policy to a normalized record.
///
/// Pure and deterministic. Both rules always run and their violations
/// accumulate; a missing total is itself a violation. An amount exactly equal
/// to the cap is compliant.
pub fn evaluate(
    record: &CanonicalRecord,
    cap: f64,
    prohibited_terms: &[String],
) -> ComplianceVerdict {
    let mut violations = Vec::new();

    if record.total_found && record.total_amount > cap {
        violations.push(Violation::CapExceeded {
            amount: record.total_amount,
            cap,
        });
    }

    for description in &record.item_descriptions {
        let description_lower = description.to_lowercase();
        for term in prohibited_terms {
            if description_lower.contains(&term.to_lowercase()) {
                violations.push(Violation::ProhibitedItem {
                    description: description.clone(),
                    term: term.clone(),
                });
            }
        }
    }

    if !record.total_found {
        violations.push(Violation::TotalNotFound);
    }

    ComplianceVerdict {
        is_compliant: violations.is_empty() && record.total_found,
        total_amount: record.total_amount,
        violations,
    }
}
