use chrono::Utc;
use db_bootstrap_core::config::DriverConfig;
use db_bootstrap_lambda::adapters::secret_store::AwsSecretStore;
use db_bootstrap_lambda::adapters::sql_session::MySqlSessionFactory;
use db_bootstrap_lambda::handlers::driver::handle_driver_invocation;
use db_bootstrap_lambda::telemetry::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct RuntimeDependencies {
    secrets: AwsSecretStore,
    sessions: MySqlSessionFactory,
}

async fn handle_request(
    deps: &RuntimeDependencies,
    event: LambdaEvent<Value>,
) -> Result<(), Error> {
    let request_id = event.context.request_id;
    let config = DriverConfig::from_env()?;

    tracing::info!(%request_id, "driver invocation started");
    handle_driver_invocation(&config, &deps.secrets, &deps.sessions).await?;
    tracing::info!(
        %request_id,
        completed_at = %Utc::now().to_rfc3339(),
        "driver invocation completed"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        secrets: AwsSecretStore::new(aws_sdk_secretsmanager::Client::new(&aws_config)),
        sessions: MySqlSessionFactory,
    };

    lambda_runtime::run(service_fn(|event| handle_request(&deps, event))).await
}
