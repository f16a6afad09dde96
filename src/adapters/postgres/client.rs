//! PostgreSQL client
//!
//! Pooled access to the clinical database. The pool is built once at
//! pipeline start and released when the owning driver drops, so every exit
//! path gives connections back.

use crate::config::DatabaseConfig;
use crate::domain::errors::DatabaseError;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// Pooled PostgreSQL client for the clinical store
pub struct PostgresClient {
    pool: Pool,
    statement_timeout_seconds: u64,
    redacted_target: String,
}

impl PostgresClient {
    /// Create a new client from configuration
    ///
    /// Building the pool is lazy; use [`test_connection`](Self::test_connection)
    /// to turn an unreachable server into an error before any query runs.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConnectionFailed`] if the pool cannot be
    /// assembled.
    pub fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .dbname(&config.dbname)
            .user(&config.user)
            .password(config.password.expose_secret().as_ref());

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .create_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .build()
            .map_err(|e| {
                DatabaseError::ConnectionFailed(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self {
            pool,
            statement_timeout_seconds: config.statement_timeout_seconds,
            redacted_target: format!(
                "postgresql://{}@{}:{}/{}",
                config.user, config.host, config.port, config.dbname
            ),
        })
    }

    /// Test the connection to PostgreSQL
    ///
    /// Gets a connection from the pool and executes a trivial query. This is
    /// the pipeline's startup gate: if it fails, no stage may run.
    pub async fn test_connection(&self) -> Result<(), DatabaseError> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Connection test failed: {e}")))?;

        tracing::info!(target_db = %self.redacted_target, "PostgreSQL connection test successful");
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<Object, DatabaseError> {
        self.pool.get().await.map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to get connection from pool: {e}"))
        })
    }

    /// Execute a read-only parameterized statement and return its rows
    ///
    /// `context` names the logical operation for error reporting.
    pub async fn query(
        &self,
        context: &str,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>, DatabaseError> {
        let client = self.get_connection().await?;
        self.apply_statement_timeout(&client, context).await?;

        client
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::QueryFailed {
                context: context.to_string(),
                message: e.to_string(),
            })
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(
        &self,
        context: &str,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64, DatabaseError> {
        let client = self.get_connection().await?;
        self.apply_statement_timeout(&client, context).await?;

        client
            .execute(statement, params)
            .await
            .map_err(|e| DatabaseError::QueryFailed {
                context: context.to_string(),
                message: e.to_string(),
            })
    }

    /// Connection target without credentials, for logs
    pub fn redacted_target(&self) -> &str {
        &self.redacted_target
    }

    async fn apply_statement_timeout(
        &self,
        client: &Object,
        context: &str,
    ) -> Result<(), DatabaseError> {
        let timeout_stmt = format!(
            "SET statement_timeout = {}",
            self.statement_timeout_seconds * 1000
        );
        client
            .execute(timeout_stmt.as_str(), &[])
            .await
            .map_err(|e| DatabaseError::QueryFailed {
                context: context.to_string(),
                message: format!("Failed to set statement timeout: {e}"),
            })?;
        Ok(())
    }
}
