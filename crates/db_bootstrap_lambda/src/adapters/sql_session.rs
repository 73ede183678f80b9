use async_trait::async_trait;
use db_bootstrap_core::credentials::CredentialBundle;
use db_bootstrap_core::error::BootstrapError;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

/// A live database connection owned by one invocation.
#[async_trait]
pub trait SqlSession: Send + Sized {
    /// Runs one statement and returns the affected row count.
    async fn execute(&mut self, sql: &str) -> Result<u64, BootstrapError>;

    async fn commit(&mut self) -> Result<(), BootstrapError>;

    async fn close(self) -> Result<(), BootstrapError>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: SqlSession;

    async fn open(&self, credentials: &CredentialBundle) -> Result<Self::Session, BootstrapError>;
}

/// Opens a session, runs `statements` in order, commits, and closes the
/// session on every exit path.
///
/// The first failure wins: a close error after a statement error is only
/// logged. Returns the total affected row count.
pub async fn with_session(
    factory: &impl SessionFactory,
    credentials: &CredentialBundle,
    statements: &[&str],
) -> Result<u64, BootstrapError> {
    let mut session = factory.open(credentials).await?;
    tracing::debug!(host = %credentials.host, database = %credentials.database, "session opened");

    let applied = apply_statements(&mut session, statements).await;
    let closed = session.close().await;

    match (applied, closed) {
        (Ok(rows_affected), Ok(())) => {
            tracing::debug!("session closed");
            Ok(rows_affected)
        }
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            tracing::warn!(error = %close_error, "session close failed after statement error");
            Err(error)
        }
    }
}

async fn apply_statements(
    session: &mut impl SqlSession,
    statements: &[&str],
) -> Result<u64, BootstrapError> {
    let mut rows_affected = 0u64;
    for (index, sql) in statements.iter().enumerate() {
        let rows = session.execute(sql).await?;
        tracing::info!(statement_index = index, rows_affected = rows, "statement executed");
        rows_affected += rows;
    }
    session.commit().await?;
    Ok(rows_affected)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlSessionFactory;

pub struct MySqlSession {
    connection: MySqlConnection,
}

#[async_trait]
impl SessionFactory for MySqlSessionFactory {
    type Session = MySqlSession;

    async fn open(&self, credentials: &CredentialBundle) -> Result<MySqlSession, BootstrapError> {
        let connection = MySqlConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .username(&credentials.username)
            .password(&credentials.password)
            .database(&credentials.database)
            .charset("utf8mb4")
            .connect()
            .await
            .map_err(BootstrapError::database)?;

        Ok(MySqlSession { connection })
    }
}

#[async_trait]
impl SqlSession for MySqlSession {
    async fn execute(&mut self, sql: &str) -> Result<u64, BootstrapError> {
        sqlx::query(sql)
            .execute(&mut self.connection)
            .await
            .map(|result| result.rows_affected())
            .map_err(BootstrapError::database)
    }

    async fn commit(&mut self) -> Result<(), BootstrapError> {
        sqlx::query("COMMIT")
            .execute(&mut self.connection)
            .await
            .map(|_| ())
            .map_err(BootstrapError::database)
    }

    async fn close(self) -> Result<(), BootstrapError> {
        self.connection
            .close()
            .await
            .map_err(BootstrapError::database)
    }
}
