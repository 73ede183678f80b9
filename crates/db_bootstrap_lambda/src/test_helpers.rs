//! In-memory stand-ins for Secrets Manager, a MySQL server, and the RDS Data
//! API. They understand just enough SQL to track which tables exist and how
//! many rows were inserted.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use db_bootstrap_core::contract::{FieldValue, StatementOutput, StatementRequest};
use db_bootstrap_core::credentials::CredentialBundle;
use db_bootstrap_core::error::BootstrapError;

use crate::adapters::data_api::StatementApi;
use crate::adapters::secret_store::SecretStore;
use crate::adapters::sql_session::{SessionFactory, SqlSession};

pub const SAMPLE_SECRET_ARN: &str =
    "arn:aws:secretsmanager:ap-northeast-1:123456789012:secret:SCGlueCatalogDemoSecret";
pub const SAMPLE_CLUSTER_ARN: &str =
    "arn:aws:rds:ap-northeast-1:123456789012:cluster:sc-gluecatalogdemo";

pub fn sample_secret_json() -> String {
    serde_json::json!({
        "dbClusterIdentifier": "sc-gluecatalogdemo",
        "password": "rotated-password",
        "dbname": "GlueCatalogDemo",
        "engine": "mysql",
        "port": 3306,
        "host": "sc-gluecatalogdemo.cluster-abc.ap-northeast-1.rds.amazonaws.com",
        "username": "admin"
    })
    .to_string()
}

pub fn sample_credentials() -> CredentialBundle {
    CredentialBundle {
        host: "sc-gluecatalogdemo.cluster-abc.ap-northeast-1.rds.amazonaws.com".to_string(),
        port: 3306,
        username: "admin".to_string(),
        password: "rotated-password".to_string(),
        database: "GlueCatalogDemo".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: HashMap<String, String>,
    denied: HashSet<String>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret_id: &str, secret: &str) -> Self {
        self.secrets.insert(secret_id.to_string(), secret.to_string());
        self
    }

    pub fn deny(mut self, secret_id: &str) -> Self {
        self.denied.insert(secret_id.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, BootstrapError> {
        if self.denied.contains(secret_id) {
            return Err(BootstrapError::AccessDenied {
                secret_id: secret_id.to_string(),
            });
        }
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| BootstrapError::SecretNotFound {
                secret_id: secret_id.to_string(),
            })
    }
}

/// Table bookkeeping shared by the driver and data API doubles.
#[derive(Debug, Default)]
struct SimulatedSchema {
    tables: BTreeMap<String, Vec<i64>>,
    next_id: i64,
}

impl SimulatedSchema {
    /// Applies one statement, returning (rows affected, generated id).
    fn apply(&mut self, sql: &str) -> Result<(u64, Option<i64>), String> {
        let words: Vec<&str> = sql.split_whitespace().collect();
        match words.as_slice() {
            ["CREATE", "TABLE", "IF", "NOT", "EXISTS", name, ..] => {
                self.tables.entry(table_name(name)).or_default();
                Ok((0, None))
            }
            ["CREATE", "TABLE", name, ..] => {
                let name = table_name(name);
                if self.tables.contains_key(&name) {
                    return Err(format!("Table '{name}' already exists"));
                }
                self.tables.insert(name, Vec::new());
                Ok((0, None))
            }
            ["INSERT", "INTO", name, ..] => {
                let name = table_name(name);
                let Some(rows) = self.tables.get_mut(&name) else {
                    return Err(format!("Table '{name}' doesn't exist"));
                };
                self.next_id += 1;
                rows.push(self.next_id);
                Ok((1, Some(self.next_id)))
            }
            ["COMMIT"] => Ok((0, None)),
            _ => Err(format!("unsupported statement: {sql}")),
        }
    }
}

fn table_name(token: &str) -> String {
    token
        .split('(')
        .next()
        .unwrap_or(token)
        .trim_matches(|c: char| c == '`' || c == ';')
        .to_string()
}

#[derive(Debug, Default)]
struct DatabaseState {
    schema: SimulatedSchema,
    commits: usize,
    sessions_opened: usize,
    open_sessions: usize,
    fail_on: Option<String>,
    fail_close: bool,
}

/// A MySQL server reachable through [`SessionFactory`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<DatabaseState>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every statement containing `fragment` fail.
    pub fn fail_on(self, fragment: &str) -> Self {
        self.lock().fail_on = Some(fragment.to_string());
        self
    }

    pub fn fail_close(self) -> Self {
        self.lock().fail_close = true;
        self
    }

    pub fn tables(&self) -> Vec<String> {
        self.lock().schema.tables.keys().cloned().collect()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock()
            .schema
            .tables
            .get(table)
            .map_or(0, Vec::len)
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DatabaseState> {
        self.state.lock().expect("poisoned mutex")
    }
}

pub struct InMemorySession {
    state: Arc<Mutex<DatabaseState>>,
}

#[async_trait]
impl SessionFactory for InMemoryDatabase {
    type Session = InMemorySession;

    async fn open(
        &self,
        _credentials: &CredentialBundle,
    ) -> Result<InMemorySession, BootstrapError> {
        let mut state = self.lock();
        state.sessions_opened += 1;
        state.open_sessions += 1;
        Ok(InMemorySession {
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl SqlSession for InMemorySession {
    async fn execute(&mut self, sql: &str) -> Result<u64, BootstrapError> {
        let mut state = self.state.lock().expect("poisoned mutex");
        if let Some(fragment) = &state.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(BootstrapError::Database(format!(
                    "simulated failure executing {sql}"
                )));
            }
        }
        state
            .schema
            .apply(sql)
            .map(|(rows_affected, _)| rows_affected)
            .map_err(BootstrapError::Database)
    }

    async fn commit(&mut self) -> Result<(), BootstrapError> {
        self.state.lock().expect("poisoned mutex").commits += 1;
        Ok(())
    }

    async fn close(self) -> Result<(), BootstrapError> {
        let mut state = self.state.lock().expect("poisoned mutex");
        state.open_sessions -= 1;
        if state.fail_close {
            return Err(BootstrapError::Database(
                "simulated failure during close".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DataApiState {
    schema: SimulatedSchema,
    requests: Vec<StatementRequest>,
    fail_on: Option<String>,
}

/// The RDS Data API: stateless calls against one simulated cluster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataApi {
    state: Arc<Mutex<DataApiState>>,
}

impl InMemoryDataApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, fragment: &str) -> Self {
        self.lock().fail_on = Some(fragment.to_string());
        self
    }

    pub fn requests(&self) -> Vec<StatementRequest> {
        self.lock().requests.clone()
    }

    pub fn tables(&self) -> Vec<String> {
        self.lock().schema.tables.keys().cloned().collect()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock()
            .schema
            .tables
            .get(table)
            .map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DataApiState> {
        self.state.lock().expect("poisoned mutex")
    }
}

#[async_trait]
impl StatementApi for InMemoryDataApi {
    async fn execute_statement(
        &self,
        request: &StatementRequest,
    ) -> Result<StatementOutput, BootstrapError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if let Some(fragment) = &state.fail_on {
            if request.sql.contains(fragment.as_str()) {
                return Err(BootstrapError::DataApi {
                    code: "BadRequestException".to_string(),
                    message: format!("simulated failure executing {}", request.sql),
                });
            }
        }

        let (rows_affected, generated_id) = state.schema.apply(&request.sql).map_err(|message| {
            BootstrapError::DataApi {
                code: "BadRequestException".to_string(),
                message,
            }
        })?;

        Ok(StatementOutput {
            number_of_records_updated: rows_affected as i64,
            generated_fields: generated_id
                .map(FieldValue::LongValue)
                .into_iter()
                .collect(),
            records: Vec::new(),
            response_metadata: None,
        })
    }
}
