use crate::config::policy::{PolicyConfig, ServiceOptions};
use crate::domain::model::AuditPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "travel-audit")]
#[command(about = "Audits expense receipts against a spending cap and a prohibited-item policy")]
pub struct AuditCli {
    /// Receipt or invoice to audit (JPG, PNG or PDF)
    pub document: PathBuf,

    /// Analysis service endpoint
    #[arg(long, env = "AZURE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Analysis service key
    #[arg(long, env = "AZURE_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Policy file (TOML); the flags below override its values
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Spending cap in the deployment's local currency
    #[arg(long)]
    pub cap: Option<f64>,

    /// Prohibited substrings, comma separated
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,

    /// Analysis models to try, in order
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl AuditCli {
    /// Endpoint and key, failing with a missing-configuration error naming
    /// the environment variable when one is absent.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let endpoint = validate_required_field("AZURE_ENDPOINT", &self.endpoint)?;
        let key = validate_required_field("AZURE_KEY", &self.key)?;
        Ok((endpoint.as_str(), key.as_str()))
    }

    /// Effective policy and service tuning: policy file first, flags on top.
    pub fn load_policy(&self) -> Result<(AuditPolicy, ServiceOptions)> {
        let config = match &self.policy {
            Some(path) => PolicyConfig::from_file(path)?,
            None => PolicyConfig::default(),
        };
        let service = config.service_options();
        let mut policy = config.into_policy();

        if let Some(cap) = self.cap {
            policy.cap = cap;
        }
        if !self.deny.is_empty() {
            policy.prohibited_terms = self.deny.clone();
        }
        if !self.models.is_empty() {
            policy.model_cascade = self.models.clone();
        }

        Ok((policy, service))
    }
}

impl Validate for AuditCli {
    fn validate(&self) -> Result<()> {
        let (endpoint, _key) = self.credentials()?;
        validate_url("AZURE_ENDPOINT", endpoint)?;
        Ok(())
    }
}
