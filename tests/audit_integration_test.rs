use httpmock::prelude::*;
use std::time::Duration;
use travel_audit::domain::model::{AttemptOutcome, AuditPolicy, Violation};
use travel_audit::{AuditOutcome, AuditSession, DocumentIntelligenceClient};

fn analyze_path(model_id: &str) -> String {
    format!("/documentintelligence/documentModels/{}:analyze", model_id)
}

fn result_path(model_id: &str) -> String {
    format!("/results/{}", model_id)
}

/// Registers a model that completes analysis with the given documents body.
fn mock_model_success(server: &MockServer, model_id: &str, analyze_result: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path(result_path(model_id));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "status": "succeeded",
                "analyzeResult": analyze_result,
            }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path(analyze_path(model_id))
            .header_exists("Ocp-Apim-Subscription-Key");
        then.status(202)
            .header("Operation-Location", server.url(result_path(model_id)));
    });
}

fn mock_model_missing(server: &MockServer, model_id: &str) {
    server.mock(|when, then| {
        when.method(POST).path(analyze_path(model_id));
        then.status(404)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "error": {"code": "NotFound", "message": "model not found"}
            }));
    });
}

fn mock_model_rate_limited(server: &MockServer, model_id: &str) {
    server.mock(|when, then| {
        when.method(POST).path(analyze_path(model_id));
        then.status(429).header("Retry-After", "60");
    });
}

fn receipt_body(total: f64, items: &[&str]) -> serde_json::Value {
    let item_fields: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            serde_json::json!({
                "type": "object",
                "valueObject": {
                    "Description": {"type": "string", "valueString": item}
                }
            })
        })
        .collect();

    serde_json::json!({
        "documents": [{
            "docType": "receipt",
            "fields": {
                "Total": {"type": "number", "valueNumber": total},
                "Items": {"type": "array", "valueArray": item_fields},
            }
        }]
    })
}

fn session(server: &MockServer, models: &[&str]) -> AuditSession<DocumentIntelligenceClient> {
    let client = DocumentIntelligenceClient::new(&server.base_url(), "test-key")
        .unwrap()
        .with_poll_interval(Duration::from_millis(10))
        .with_max_polls(5);
    let policy = AuditPolicy {
        cap: 80.0,
        prohibited_terms: vec!["beer".to_string(), "wine".to_string()],
        model_cascade: models.iter().map(|model| model.to_string()).collect(),
    };
    AuditSession::new(client, policy)
}

#[tokio::test]
async fn test_compliant_receipt_end_to_end() {
    let server = MockServer::start();
    mock_model_success(
        &server,
        "prebuilt-receipt",
        receipt_body(75.0, &["Coffee", "Sandwich"]),
    );

    // The document travels through the filesystem as it would from an upload.
    let temp_dir = tempfile::TempDir::new().unwrap();
    let document_path = temp_dir.path().join("receipt.jpg");
    std::fs::write(&document_path, b"fake image bytes").unwrap();
    let document = tokio::fs::read(&document_path).await.unwrap();

    let outcome = session(&server, &["prebuilt-receipt"]).audit(&document).await;

    match outcome {
        AuditOutcome::Verdict { verdict, trail } => {
            assert!(verdict.is_compliant);
            assert_eq!(verdict.total_amount, 75.0);
            assert!(verdict.violations.is_empty());
            assert_eq!(trail.len(), 1);
        }
        other => panic!("expected a verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cap_exceeded_end_to_end() {
    let server = MockServer::start();
    mock_model_success(&server, "prebuilt-receipt", receipt_body(95.0, &["Taxi"]));

    let outcome = session(&server, &["prebuilt-receipt"]).audit(b"bytes").await;

    match outcome {
        AuditOutcome::Verdict { verdict, .. } => {
            assert!(!verdict.is_compliant);
            assert_eq!(
                verdict.violations,
                vec![Violation::CapExceeded {
                    amount: 95.0,
                    cap: 80.0
                }]
            );
        }
        other => panic!("expected a verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_prohibited_item_end_to_end() {
    let server = MockServer::start();
    mock_model_success(
        &server,
        "prebuilt-receipt",
        receipt_body(50.0, &["2x Beer", "Water"]),
    );

    let outcome = session(&server, &["prebuilt-receipt"]).audit(b"bytes").await;

    match outcome {
        AuditOutcome::Verdict { verdict, .. } => {
            assert!(!verdict.is_compliant);
            assert_eq!(
                verdict.violations,
                vec![Violation::ProhibitedItem {
                    description: "2x beer".to_string(),
                    term: "beer".to_string()
                }]
            );
        }
        other => panic!("expected a verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cascade_recovers_across_models() {
    let server = MockServer::start();
    mock_model_missing(&server, "expense-custom");
    mock_model_success(&server, "prebuilt-receipt", receipt_body(0.0, &[]));
    mock_model_success(
        &server,
        "prebuilt-invoice",
        receipt_body(60.0, &["Lunch"]),
    );

    let outcome = session(
        &server,
        &["expense-custom", "prebuilt-receipt", "prebuilt-invoice"],
    )
    .audit(b"bytes")
    .await;

    assert_eq!(outcome.winning_model(), Some("prebuilt-invoice"));
    match outcome {
        AuditOutcome::Verdict { verdict, trail } => {
            assert!(verdict.is_compliant);
            assert_eq!(verdict.total_amount, 60.0);
            assert_eq!(trail.len(), 3);
            assert!(matches!(
                trail[0].outcome,
                AttemptOutcome::Unavailable { .. }
            ));
            assert_eq!(trail[1].outcome, AttemptOutcome::NoUsableTotal);
            assert!(matches!(trail[2].outcome, AttemptOutcome::Success(_)));
        }
        other => panic!("expected a verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_all_models_without_usable_total() {
    let server = MockServer::start();
    for model in ["expense-custom", "prebuilt-receipt", "prebuilt-invoice"] {
        mock_model_success(&server, model, receipt_body(0.0, &[]));
    }

    let outcome = session(
        &server,
        &["expense-custom", "prebuilt-receipt", "prebuilt-invoice"],
    )
    .audit(b"bytes")
    .await;

    match outcome {
        AuditOutcome::NoDataExtracted { trail } => {
            assert_eq!(trail.len(), 3);
            assert!(trail
                .iter()
                .all(|attempt| attempt.outcome == AttemptOutcome::NoUsableTotal));
        }
        other => panic!("expected no-data outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_service_yields_retry_later() {
    let server = MockServer::start();
    mock_model_rate_limited(&server, "expense-custom");
    mock_model_rate_limited(&server, "prebuilt-receipt");

    let outcome = session(&server, &["expense-custom", "prebuilt-receipt"])
        .audit(b"bytes")
        .await;

    match outcome {
        AuditOutcome::RateLimited { trail } => {
            assert_eq!(trail.len(), 2);
            assert!(trail
                .iter()
                .all(|attempt| matches!(attempt.outcome, AttemptOutcome::RateLimited { .. })));
        }
        other => panic!("expected retry-later outcome, got {:?}", other),
    }
}
