use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use db_bootstrap_core::credentials::CredentialBundle;
use db_bootstrap_core::error::BootstrapError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Raw `SecretString` stored under `secret_id`.
    async fn secret_string(&self, secret_id: &str) -> Result<String, BootstrapError>;
}

/// Reads the credential bundle stored under `secret_id`.
///
/// Store failures (not found, access denied, ...) are returned unchanged.
pub async fn fetch_credentials(
    store: &(impl SecretStore + ?Sized),
    secret_id: &str,
) -> Result<CredentialBundle, BootstrapError> {
    let secret = store.secret_string(secret_id).await?;
    let credentials = CredentialBundle::from_secret_string(&secret)?;
    tracing::info!(
        secret_id,
        host = %credentials.host,
        port = credentials.port,
        database = %credentials.database,
        "credential bundle fetched"
    );
    Ok(credentials)
}

pub struct AwsSecretStore {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, BootstrapError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|error| classify_error(secret_id, error.into_service_error()))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| BootstrapError::SecretNotString {
                secret_id: secret_id.to_string(),
            })
    }
}

fn classify_error(secret_id: &str, error: GetSecretValueError) -> BootstrapError {
    if error.is_resource_not_found_exception() {
        return BootstrapError::SecretNotFound {
            secret_id: secret_id.to_string(),
        };
    }

    match error.code() {
        Some("AccessDeniedException") => BootstrapError::AccessDenied {
            secret_id: secret_id.to_string(),
        },
        _ => BootstrapError::SecretStore(DisplayErrorContext(&error).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_secretsmanager::error::ErrorMetadata;

    use super::*;
    use crate::test_helpers::InMemorySecretStore;

    const SECRET_ARN: &str = "arn:aws:secretsmanager:ap-northeast-1:123:secret:db";

    #[tokio::test]
    async fn fetches_bundle_with_all_fields() {
        let store = InMemorySecretStore::new().with_secret(
            SECRET_ARN,
            r#"{"host":"db.local","port":3306,"username":"admin","password":"pw","dbname":"GlueCatalogDemo"}"#,
        );

        let credentials = fetch_credentials(&store, SECRET_ARN)
            .await
            .expect("secret should resolve");

        assert_eq!(credentials.host, "db.local");
        assert_eq!(credentials.port, 3306);
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "pw");
        assert_eq!(credentials.database, "GlueCatalogDemo");
    }

    #[tokio::test]
    async fn missing_secret_propagates_unchanged() {
        let store = InMemorySecretStore::new();

        let error = fetch_credentials(&store, "arn:missing")
            .await
            .expect_err("missing secret should fail");

        match error {
            BootstrapError::SecretNotFound { secret_id } => assert_eq!(secret_id, "arn:missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn denied_secret_propagates_unchanged() {
        let store = InMemorySecretStore::new().deny(SECRET_ARN);

        let error = fetch_credentials(&store, SECRET_ARN)
            .await
            .expect_err("denied secret should fail");

        assert!(matches!(error, BootstrapError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn malformed_secret_is_reported() {
        let store = InMemorySecretStore::new().with_secret(SECRET_ARN, "not json");

        let error = fetch_credentials(&store, SECRET_ARN)
            .await
            .expect_err("malformed secret should fail");

        assert!(matches!(error, BootstrapError::MalformedCredentials(_)));
    }

    #[test]
    fn not_found_exception_maps_to_secret_not_found() {
        let error = GetSecretValueError::ResourceNotFoundException(
            aws_sdk_secretsmanager::types::error::ResourceNotFoundException::builder()
                .message("Secrets Manager can't find the specified secret.")
                .build(),
        );

        assert!(matches!(
            classify_error("arn:x", error),
            BootstrapError::SecretNotFound { .. }
        ));
    }

    #[test]
    fn access_denied_code_maps_to_access_denied() {
        let error = GetSecretValueError::generic(
            ErrorMetadata::builder()
                .code("AccessDeniedException")
                .message("User is not authorized to perform secretsmanager:GetSecretValue")
                .build(),
        );

        match classify_error("arn:x", error) {
            BootstrapError::AccessDenied { secret_id } => assert_eq!(secret_id, "arn:x"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_service_errors_keep_their_context() {
        let error = GetSecretValueError::generic(
            ErrorMetadata::builder()
                .code("InternalServiceError")
                .message("An error occurred on the server side.")
                .build(),
        );

        match classify_error("arn:x", error) {
            BootstrapError::SecretStore(message) => {
                assert!(message.contains("An error occurred on the server side."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
