use chrono::Utc;
use db_bootstrap_core::config::ProxyConfig;
use db_bootstrap_core::contract::ProxyResponse;
use db_bootstrap_lambda::adapters::data_api::AwsDataApi;
use db_bootstrap_lambda::adapters::secret_store::AwsSecretStore;
use db_bootstrap_lambda::handlers::proxy::handle_proxy_invocation;
use db_bootstrap_lambda::telemetry::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct RuntimeDependencies {
    secrets: AwsSecretStore,
    data_api: AwsDataApi,
}

async fn handle_request(
    deps: &RuntimeDependencies,
    event: LambdaEvent<Value>,
) -> Result<ProxyResponse, Error> {
    let request_id = event.context.request_id;
    let config = ProxyConfig::from_env()?;

    tracing::info!(%request_id, cluster_arn = %config.cluster_arn, "proxy invocation started");
    let response = handle_proxy_invocation(&config, &deps.secrets, &deps.data_api).await?;
    tracing::info!(
        %request_id,
        status_code = response.status_code,
        completed_at = %Utc::now().to_rfc3339(),
        "proxy invocation completed"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        secrets: AwsSecretStore::new(aws_sdk_secretsmanager::Client::new(&aws_config)),
        data_api: AwsDataApi::new(aws_sdk_rdsdata::Client::new(&aws_config)),
    };

    lambda_runtime::run(service_fn(|event| handle_request(&deps, event))).await
}
