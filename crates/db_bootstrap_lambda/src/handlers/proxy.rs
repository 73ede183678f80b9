use db_bootstrap_core::config::ProxyConfig;
use db_bootstrap_core::contract::{ProxyResponse, StatementOutput, StatementRequest};
use db_bootstrap_core::error::BootstrapError;
use db_bootstrap_core::statements::proxy_statements;

use crate::adapters::data_api::StatementApi;
use crate::adapters::secret_store::{fetch_credentials, SecretStore};

/// Creates the `user` table through the data API and inserts the demo row.
///
/// Every call inserts another row. The body holds the output of the last
/// statement. Only `dbname` is sent, but the whole bundle must parse.
pub async fn handle_proxy_invocation(
    config: &ProxyConfig,
    secrets: &impl SecretStore,
    data_api: &impl StatementApi,
) -> Result<ProxyResponse, BootstrapError> {
    let credentials = fetch_credentials(secrets, &config.secret_arn).await?;

    let mut last_output = StatementOutput::default();
    for (index, sql) in proxy_statements().iter().enumerate() {
        let request = StatementRequest {
            secret_arn: config.secret_arn.clone(),
            resource_arn: config.cluster_arn.clone(),
            sql: sql.to_string(),
            database: credentials.database.clone(),
        };
        last_output = data_api.execute_statement(&request).await?;
        tracing::info!(
            statement_index = index,
            records_updated = last_output.number_of_records_updated,
            "statement executed"
        );
    }

    ProxyResponse::success(&last_output)
}
