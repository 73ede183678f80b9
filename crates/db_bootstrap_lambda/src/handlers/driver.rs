use db_bootstrap_core::config::DriverConfig;
use db_bootstrap_core::error::BootstrapError;
use db_bootstrap_core::statements::driver_statements;

use crate::adapters::secret_store::{fetch_credentials, SecretStore};
use crate::adapters::sql_session::{with_session, SessionFactory};

/// Ensures the `user` table exists over a direct connection.
///
/// Safe to repeat: the table definition is guarded by `IF NOT EXISTS`.
pub async fn handle_driver_invocation(
    config: &DriverConfig,
    secrets: &impl SecretStore,
    sessions: &impl SessionFactory,
) -> Result<(), BootstrapError> {
    let credentials = fetch_credentials(secrets, &config.secret_arn).await?;
    let rows_affected = with_session(sessions, &credentials, driver_statements()).await?;
    tracing::info!(
        database = %credentials.database,
        rows_affected,
        "user table ensured"
    );
    Ok(())
}
