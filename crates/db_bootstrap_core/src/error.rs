use thiserror::Error;

/// Every way a bootstrap invocation can fail.
///
/// Nothing is retried or translated: handlers return the first error and the
/// Lambda runtime reports it as a failed invocation.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{key} must be configured")]
    MissingEnv { key: String },

    #[error("secret '{secret_id}' was not found")]
    SecretNotFound { secret_id: String },

    #[error("access denied reading secret '{secret_id}'")]
    AccessDenied { secret_id: String },

    #[error("secrets store request failed: {0}")]
    SecretStore(String),

    #[error("secret '{secret_id}' has no string payload")]
    SecretNotString { secret_id: String },

    #[error("malformed credential bundle: {0}")]
    MalformedCredentials(#[source] serde_json::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("data api error ({code}): {message}")]
    DataApi { code: String, message: String },

    #[error("failed to serialize response: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl BootstrapError {
    pub fn missing_env(key: impl Into<String>) -> Self {
        Self::MissingEnv { key: key.into() }
    }

    pub fn database(error: impl std::fmt::Display) -> Self {
        Self::Database(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_names_the_variable() {
        let error = BootstrapError::missing_env("DB_CLUSTER_ARN");
        assert_eq!(error.to_string(), "DB_CLUSTER_ARN must be configured");
    }

    #[test]
    fn data_api_error_carries_code_and_message() {
        let error = BootstrapError::DataApi {
            code: "BadRequestException".to_string(),
            message: "Table 'user' already exists".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "data api error (BadRequestException): Table 'user' already exists"
        );
    }
}
