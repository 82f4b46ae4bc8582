use crate::domain::model::AuditPolicy;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_positive_amount, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk audit policy. Every section and value is optional; anything
/// missing falls back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub policy: Option<PolicySection>,
    pub cascade: Option<CascadeSection>,
    pub service: Option<ServiceSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySection {
    pub cap: Option<f64>,
    pub prohibited_items: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CascadeSection {
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    pub api_version: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_polls: Option<u32>,
}

/// Analysis-client tuning resolved from the `[service]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceOptions {
    pub api_version: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_polls: Option<u32>,
}

impl PolicyConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AuditError::InvalidConfigValue {
            field: "policy file".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })
    }

    /// Effective policy: file values where present, defaults elsewhere.
    pub fn into_policy(self) -> AuditPolicy {
        let mut policy = AuditPolicy::default();

        if let Some(section) = self.policy {
            if let Some(cap) = section.cap {
                policy.cap = cap;
            }
            if let Some(prohibited_items) = section.prohibited_items {
                policy.prohibited_terms = prohibited_items;
            }
        }
        if let Some(models) = self.cascade.and_then(|section| section.models) {
            policy.model_cascade = models;
        }

        policy
    }

    pub fn service_options(&self) -> ServiceOptions {
        match &self.service {
            Some(section) => ServiceOptions {
                api_version: section.api_version.clone(),
                poll_interval_ms: section.poll_interval_ms,
                max_polls: section.max_polls,
            },
            None => ServiceOptions::default(),
        }
    }
}

impl Validate for AuditPolicy {
    fn validate(&self) -> Result<()> {
        validate_positive_amount("cap", self.cap)?;
        validate_non_empty_list("cascade.models", &self.model_cascade)?;
        for term in &self.prohibited_terms {
            validate_non_empty_string("policy.prohibited_items", term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DEFAULT_CAP, DEFAULT_MODEL_CASCADE};

    #[test]
    fn test_empty_file_falls_back_to_defaults() {
        let policy = PolicyConfig::from_toml("").unwrap().into_policy();

        assert_eq!(policy.cap, DEFAULT_CAP);
        assert!(policy.prohibited_terms.contains(&"cerveja".to_string()));
        assert_eq!(policy.model_cascade, DEFAULT_MODEL_CASCADE.to_vec());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let content = r#"
            [policy]
            cap = 120.0
            prohibited_items = ["tobacco"]

            [cascade]
            models = ["my-custom-model", "prebuilt-receipt"]

            [service]
            api_version = "2023-07-31"
            poll_interval_ms = 250
        "#;
        let config = PolicyConfig::from_toml(content).unwrap();

        let options = config.service_options();
        assert_eq!(options.api_version.as_deref(), Some("2023-07-31"));
        assert_eq!(options.poll_interval_ms, Some(250));
        assert_eq!(options.max_polls, None);

        let policy = config.into_policy();
        assert_eq!(policy.cap, 120.0);
        assert_eq!(policy.prohibited_terms, vec!["tobacco"]);
        assert_eq!(
            policy.model_cascade,
            vec!["my-custom-model", "prebuilt-receipt"]
        );
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let error = PolicyConfig::from_toml("cap = [").unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_policy_validation() {
        assert!(AuditPolicy::default().validate().is_ok());

        let mut policy = AuditPolicy::default();
        policy.cap = 0.0;
        assert!(policy.validate().is_err());

        let mut policy = AuditPolicy::default();
        policy.model_cascade.clear();
        assert!(policy.validate().is_err());
    }
}
