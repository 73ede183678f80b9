use crate::error::BootstrapError;

pub const STACK_NAME_ENV: &str = "STACK_NAME";
pub const DEFAULT_STACK_NAME: &str = "GlueCatalogDemo";
pub const CLUSTER_ARN_ENV: &str = "DB_CLUSTER_ARN";

/// Name of the variable holding the secret ARN, e.g. `DB_SECRET_ARN_GlueCatalogDemo`.
pub fn secret_arn_env_key(stack_name: &str) -> String {
    format!("DB_SECRET_ARN_{stack_name}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub secret_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub secret_arn: String,
    pub cluster_arn: String,
}

impl DriverConfig {
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BootstrapError> {
        Ok(Self {
            secret_arn: secret_arn(&lookup)?,
        })
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BootstrapError> {
        Ok(Self {
            secret_arn: secret_arn(&lookup)?,
            cluster_arn: required(&lookup, CLUSTER_ARN_ENV)?,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn secret_arn(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, BootstrapError> {
    let stack_name = non_empty(lookup(STACK_NAME_ENV))
        .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string());
    required(lookup, &secret_arn_env_key(&stack_name))
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, BootstrapError> {
    non_empty(lookup(key)).ok_or_else(|| BootstrapError::missing_env(key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn driver_reads_secret_arn_for_default_stack() {
        let config = DriverConfig::from_lookup(lookup_from(&[(
            "DB_SECRET_ARN_GlueCatalogDemo",
            "arn:aws:secretsmanager:ap-northeast-1:123:secret:db",
        )]))
        .expect("config should load");

        assert_eq!(
            config.secret_arn,
            "arn:aws:secretsmanager:ap-northeast-1:123:secret:db"
        );
    }

    #[test]
    fn stack_name_selects_secret_variable() {
        let config = DriverConfig::from_lookup(lookup_from(&[
            ("STACK_NAME", "Staging"),
            ("DB_SECRET_ARN_GlueCatalogDemo", "wrong"),
            ("DB_SECRET_ARN_Staging", "right"),
        ]))
        .expect("config should load");

        assert_eq!(config.secret_arn, "right");
    }

    #[test]
    fn proxy_requires_cluster_arn() {
        let error = ProxyConfig::from_lookup(lookup_from(&[(
            "DB_SECRET_ARN_GlueCatalogDemo",
            "secret",
        )]))
        .expect_err("cluster arn is required");

        assert!(matches!(error, BootstrapError::MissingEnv { ref key } if key == "DB_CLUSTER_ARN"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let error = DriverConfig::from_lookup(lookup_from(&[(
            "DB_SECRET_ARN_GlueCatalogDemo",
            "   ",
        )]))
        .expect_err("blank secret arn should fail");

        assert_eq!(
            error.to_string(),
            "DB_SECRET_ARN_GlueCatalogDemo must be configured"
        );
    }

    #[test]
    fn proxy_loads_both_arns() {
        let config = ProxyConfig::from_lookup(lookup_from(&[
            ("DB_SECRET_ARN_GlueCatalogDemo", "secret"),
            ("DB_CLUSTER_ARN", "cluster"),
        ]))
        .expect("config should load");

        assert_eq!(
            config,
            ProxyConfig {
                secret_arn: "secret".to_string(),
                cluster_arn: "cluster".to_string(),
            }
        );
    }
}
