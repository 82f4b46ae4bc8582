use clap::Parser;
use travel_audit::utils::{logger, validation::Validate};
use travel_audit::{AuditCli, AuditOutcome, AuditSession, DocumentIntelligenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = AuditCli::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting travel-audit");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // Health check: credentials and policy must be in order before the
    // document is even read.
    if let Err(e) = cli.validate() {
        tracing::error!("Configuration check failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(4);
    }

    let (policy, service) = match cli.load_policy() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(4);
        }
    };
    if let Err(e) = policy.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(4);
    }

    let (endpoint, key) = cli.credentials()?;
    let mut client = DocumentIntelligenceClient::new(endpoint, key)?;
    if let Some(api_version) = &service.api_version {
        client = client.with_api_version(api_version);
    }
    if let Some(poll_interval_ms) = service.poll_interval_ms {
        client = client.with_poll_interval(std::time::Duration::from_millis(poll_interval_ms));
    }
    if let Some(max_polls) = service.max_polls {
        client = client.with_max_polls(max_polls);
    }

    let document = match tokio::fs::read(&cli.document).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Could not read {}: {}", cli.document.display(), e);
            std::process::exit(4);
        }
    };

    tracing::info!(
        "Auditing {} ({} bytes) against a {:.2} cap and {} prohibited terms",
        cli.document.display(),
        document.len(),
        policy.cap,
        policy.prohibited_terms.len()
    );

    let session = AuditSession::new(client, policy);
    let outcome = session.audit(&document).await;

    let exit_code = render_outcome(&outcome);
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn render_outcome(outcome: &AuditOutcome) -> i32 {
    println!("Model attempts:");
    for attempt in outcome.trail() {
        println!("  {} -> {}", attempt.model_id, attempt.outcome);
    }
    println!();

    match outcome {
        AuditOutcome::Verdict { verdict, .. } => {
            if verdict.is_compliant {
                println!("✅ RECEIPT APPROVED! Total: {:.2}", verdict.total_amount);
                if let Some(model) = outcome.winning_model() {
                    println!("   Extracted by model: {}", model);
                }
                0
            } else {
                println!("❌ RECEIPT REJECTED");
                for violation in &verdict.violations {
                    println!("  ⚠️ {}", violation);
                }
                println!("   Extracted total: {:.2}", verdict.total_amount);
                1
            }
        }
        AuditOutcome::NoDataExtracted { .. } => {
            println!("🚫 No financial data could be extracted from this document.");
            2
        }
        AuditOutcome::RateLimited { .. } => {
            println!("⏳ The analysis service is rate limiting requests. Retry in a few minutes.");
            3
        }
    }
}
