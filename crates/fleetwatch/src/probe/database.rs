//! Database probing.
//!
//! The tabular query protocol itself is external: a [`QueryExecutor`] is the
//! seam where a driver plugs in. [`TransportQueryExecutor`] only checks that
//! the database port accepts connections.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};
use tracing::{error, info};

use super::types::ProbeResult;
use crate::error::FleetError;
use crate::registry::DeviceTarget;

/// Characters of a query echoed into the logs
const LOG_PREVIEW_CHARS: usize = 50;

const TABLES_QUERY: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Rows returned by a query plus affected row counts per statement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutput {
    pub recordset: Vec<Map<String, Value>>,
    pub rows_affected: Vec<u64>,
}

impl Serialize for QueryOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryOutput", 3)?;
        state.serialize_field("success", &true)?;
        state.serialize_field("recordset", &self.recordset)?;
        state.serialize_field("rowsAffected", &self.rows_affected)?;
        state.end()
    }
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Open a session and run a trivial statement
    async fn test_connection(&self, target: &DeviceTarget) -> Result<(), FleetError>;

    async fn execute_query(&self, target: &DeviceTarget, query: &str) -> Result<QueryOutput, FleetError>;
}

/// Executor that only verifies the database port accepts connections
pub struct TransportQueryExecutor {
    timeout_duration: Duration,
}

impl TransportQueryExecutor {
    pub fn new(timeout_duration: Duration) -> Self {
        Self { timeout_duration }
    }
}

#[async_trait]
impl QueryExecutor for TransportQueryExecutor {
    async fn test_connection(&self, target: &DeviceTarget) -> Result<(), FleetError> {
        let connect = TcpStream::connect((target.host.as_str(), target.port));
        timeout(self.timeout_duration, connect).await.map_err(|_| FleetError::Timeout("Connection"))??;
        Ok(())
    }

    async fn execute_query(&self, target: &DeviceTarget, _query: &str) -> Result<QueryOutput, FleetError> {
        Err(FleetError::UpstreamProtocol(format!(
            "No query driver configured for database {}",
            target.id
        )))
    }
}

/// Database probe and query pass-through.
///
/// Executor calls are bounded here, whether or not the driver honours its own deadlines.
#[derive(Clone)]
pub struct DatabaseProbe {
    executor: Arc<dyn QueryExecutor>,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl DatabaseProbe {
    pub fn new(executor: Arc<dyn QueryExecutor>, connect_timeout: Duration, query_timeout: Duration) -> Self {
        Self { executor, connect_timeout, query_timeout }
    }

    pub async fn probe(&self, target: &DeviceTarget) -> ProbeResult {
        let start = Instant::now();

        let attempt = timeout(self.connect_timeout, self.executor.test_connection(target))
            .await
            .unwrap_or(Err(FleetError::Timeout("Connection")));

        let result = match attempt {
            Ok(()) => {
                info!(database = %target.id, "Connection to database successful");
                ProbeResult::success("Connection successful")
            }
            Err(e) => {
                error!(database = %target.id, error = %e, "Connection to database failed");
                ProbeResult::failure(e.to_string())
            }
        };

        result.with_elapsed(start.elapsed())
    }

    pub async fn execute(&self, target: &DeviceTarget, query: &str) -> Result<QueryOutput, FleetError> {
        let attempt = timeout(self.query_timeout, self.executor.execute_query(target, query))
            .await
            .unwrap_or(Err(FleetError::Timeout("Query")));

        match attempt {
            Ok(output) => {
                let preview: String = query.chars().take(LOG_PREVIEW_CHARS).collect();
                info!(database = %target.id, query = %preview, "Query executed");
                Ok(output)
            }
            Err(e) => {
                error!(database = %target.id, error = %e, "Query failed");
                Err(e)
            }
        }
    }

    pub async fn list_tables(&self, target: &DeviceTarget) -> Result<QueryOutput, FleetError> {
        self.execute(target, TABLES_QUERY).await
    }

    pub async fn table_schema(&self, target: &DeviceTarget, table: &str) -> Result<QueryOutput, FleetError> {
        self.execute(target, &schema_query(table)?).await
    }
}

fn schema_query(table: &str) -> Result<String, FleetError> {
    if !is_identifier(table) {
        return Err(FleetError::UpstreamProtocol(format!("Invalid table name: {table}")));
    }

    Ok(format!(
        "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, CHARACTER_MAXIMUM_LENGTH \
         FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_NAME = '{table}' \
         ORDER BY ORDINAL_POSITION"
    ))
}

/// Plain table identifier, safe to splice into catalog queries
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}
