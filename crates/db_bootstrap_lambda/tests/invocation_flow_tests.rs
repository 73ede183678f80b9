use std::collections::HashMap;

use db_bootstrap_core::config::{DriverConfig, ProxyConfig};
use db_bootstrap_core::error::BootstrapError;
use db_bootstrap_lambda::handlers::driver::handle_driver_invocation;
use db_bootstrap_lambda::handlers::proxy::handle_proxy_invocation;
use db_bootstrap_lambda::test_helpers::{
    sample_secret_json, InMemoryDataApi, InMemoryDatabase, InMemorySecretStore,
    SAMPLE_CLUSTER_ARN, SAMPLE_SECRET_ARN,
};
use serde_json::{json, Value};

fn deployed_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("DB_SECRET_ARN_GlueCatalogDemo", SAMPLE_SECRET_ARN),
        ("DB_CLUSTER_ARN", SAMPLE_CLUSTER_ARN),
    ])
}

fn lookup<'a>(env: &'a HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| env.get(key).map(|value| value.to_string())
}

#[tokio::test]
async fn driver_flow_from_environment_to_table() {
    let env = deployed_env();
    let config = DriverConfig::from_lookup(lookup(&env)).expect("config should load");
    let secrets =
        InMemorySecretStore::new().with_secret(SAMPLE_SECRET_ARN, &sample_secret_json());
    let database = InMemoryDatabase::new();

    for _ in 0..3 {
        handle_driver_invocation(&config, &secrets, &database)
            .await
            .expect("invocation should pass");
    }

    assert_eq!(database.tables(), vec!["user".to_string()]);
    assert_eq!(database.row_count("user"), 0);
    assert_eq!(database.open_sessions(), 0);
}

#[tokio::test]
async fn proxy_flow_returns_lambda_proxy_shape() {
    let env = deployed_env();
    let config = ProxyConfig::from_lookup(lookup(&env)).expect("config should load");
    let secrets =
        InMemorySecretStore::new().with_secret(SAMPLE_SECRET_ARN, &sample_secret_json());
    let data_api = InMemoryDataApi::new();

    let response = handle_proxy_invocation(&config, &secrets, &data_api)
        .await
        .expect("invocation should pass");

    let rendered = serde_json::to_value(&response).expect("response should serialize");
    assert_eq!(rendered["statusCode"], json!(200));

    let body: Value = serde_json::from_str(
        rendered["body"].as_str().expect("body should be a string"),
    )
    .expect("body should hold json");
    assert_eq!(
        body,
        json!({
            "numberOfRecordsUpdated": 1,
            "generatedFields": [{"longValue": 1}]
        })
    );
}

#[tokio::test]
async fn proxy_flow_duplicates_rows_per_invocation() {
    let env = deployed_env();
    let config = ProxyConfig::from_lookup(lookup(&env)).expect("config should load");
    let secrets =
        InMemorySecretStore::new().with_secret(SAMPLE_SECRET_ARN, &sample_secret_json());
    let data_api = InMemoryDataApi::new();

    for _ in 0..2 {
        handle_proxy_invocation(&config, &secrets, &data_api)
            .await
            .expect("invocation should pass");
    }

    assert_eq!(data_api.row_count("user"), 2);
}

#[test]
fn proxy_config_fails_without_cluster_arn() {
    let env = HashMap::from([("DB_SECRET_ARN_GlueCatalogDemo", SAMPLE_SECRET_ARN)]);

    let error = ProxyConfig::from_lookup(lookup(&env)).expect_err("cluster arn is required");

    assert!(matches!(error, BootstrapError::MissingEnv { ref key } if key == "DB_CLUSTER_ARN"));
}

#[tokio::test]
async fn unknown_secret_fails_both_flows_unchanged() {
    let env = deployed_env();
    let secrets = InMemorySecretStore::new();

    let driver_error = handle_driver_invocation(
        &DriverConfig::from_lookup(lookup(&env)).expect("config should load"),
        &secrets,
        &InMemoryDatabase::new(),
    )
    .await
    .expect_err("driver should fail");
    let proxy_error = handle_proxy_invocation(
        &ProxyConfig::from_lookup(lookup(&env)).expect("config should load"),
        &secrets,
        &InMemoryDataApi::new(),
    )
    .await
    .expect_err("proxy should fail");

    for error in [driver_error, proxy_error] {
        assert_eq!(
            error.to_string(),
            format!("secret '{SAMPLE_SECRET_ARN}' was not found")
        );
    }
}
