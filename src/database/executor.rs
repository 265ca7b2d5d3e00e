//! Every statement the service issues goes through [`QueryExecutor`].
//!
//! Each attempt checks out one pooled connection for the duration of a single
//! statement (or a single transaction for [`QueryExecutor::run`]). When the
//! failure looks like a dropped connection the statement is reissued after a
//! fixed backoff, up to the configured number of retries. Anything else is
//! returned to the caller straight away.

use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlQueryResult, MySqlRow};
use sqlx::{Arguments, FromRow, MySql, Pool};
use tracing::warn;

use crate::errors::QueryError;

/// Error message fragments that mark a connection the server or an
/// intermediary has dropped.
const TRANSIENT_MARKERS: &[&str] = &[
    "closed state",
    "connection reset",
    "connection lost",
    "lost connection",
    "server has gone away",
    "connection closed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// A positional statement parameter, bound to the `?` placeholder with the same index.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    Decimal(Decimal),
}

impl SqlParam {
    fn add_to(&self, args: &mut MySqlArguments) -> Result<(), sqlx::error::BoxDynError> {
        match self {
            SqlParam::Text(value) => args.add(value.clone()),
            SqlParam::Int(value) => args.add(*value),
            SqlParam::Date(value) => args.add(*value),
            SqlParam::Time(value) => args.add(*value),
            SqlParam::Decimal(value) => args.add(*value),
        }
    }
}

fn arguments(params: &[SqlParam]) -> Result<MySqlArguments, sqlx::Error> {
    let mut args = MySqlArguments::default();
    for param in params {
        param.add_to(&mut args).map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// True for failures that a fresh connection is expected to fix.
pub fn is_transient(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Io(io) = error {
        if matches!(
            io.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ) {
            return true;
        }
    }

    let message = error.to_string().to_lowercase();
    TRANSIENT_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the retry
/// budget is spent. Exhaustion is reported as [`QueryError::Unavailable`].
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, QueryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut remaining = policy.retries;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && remaining > 0 => {
                remaining -= 1;
                warn!(
                    statement = label,
                    attempt = attempts,
                    retries_left = remaining,
                    error = %e,
                    "Transient database failure, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) if is_transient(&e) => {
                warn!(statement = label, attempts, error = %e, "Database retries exhausted");
                return Err(QueryError::Unavailable { attempts, source: e });
            }
            Err(e) => return Err(QueryError::Database(e)),
        }
    }
}

#[derive(Clone)]
pub struct QueryExecutor {
    pool: Pool<MySql>,
    policy: RetryPolicy,
}

impl QueryExecutor {
    pub fn new(pool: Pool<MySql>, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn fetch_all<T>(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let pool = &self.pool;
        retry_transient(&self.policy, sql, || async move {
            let args = arguments(params)?;
            sqlx::query_as_with::<_, T, _>(sql, args).fetch_all(pool).await
        })
        .await
    }

    pub async fn fetch_optional<T>(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<T>, QueryError>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let pool = &self.pool;
        retry_transient(&self.policy, sql, || async move {
            let args = arguments(params)?;
            sqlx::query_as_with::<_, T, _>(sql, args)
                .fetch_optional(pool)
                .await
        })
        .await
    }

    /// Runs a mutating statement. The result carries the affected row count
    /// and the last insert id.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<MySqlQueryResult, QueryError> {
        let pool = &self.pool;
        retry_transient(&self.policy, sql, || async move {
            let args = arguments(params)?;
            sqlx::query_with(sql, args).execute(pool).await
        })
        .await
    }

    /// Retries a whole unit of work that needs the pool itself, e.g. a transaction.
    /// `op` is invoked once per attempt.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, QueryError>
    where
        F: FnMut(Pool<MySql>) -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        retry_transient(&self.policy, label, || op(self.pool.clone())).await
    }

    /// Binds `params` for use inside [`QueryExecutor::run`].
    pub fn bind(params: &[SqlParam]) -> Result<MySqlArguments, sqlx::Error> {
        arguments(params)
    }

    pub async fn ping(&self) -> Result<(), QueryError> {
        let pool = &self.pool;
        retry_transient(&self.policy, "SELECT 1", || async move {
            sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
        })
        .await
    }
}
