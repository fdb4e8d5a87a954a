//! User-record lookup against the relational database.
//!
//! Connections are opened per lookup and closed before returning; there is
//! no pool and no reuse across invocations.

use serde_json::{Map, Value};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row, TypeInfo};
use tracing::{error, warn};

use crate::claims::extract_subject;
use crate::config::DatabaseConfig;
use crate::error::LookupError;

/// A user row returned as a key-value mapping.
pub type UserRecord = Map<String, Value>;

/// Fetch the user row keyed by the subject identifier in the event's claims.
pub async fn fetch_user_by_id(
    config: &DatabaseConfig,
    event: &Value,
) -> Result<UserRecord, LookupError> {
    let user_id = extract_subject(event)?;

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .username(&config.user)
        .password(&config.password)
        .database(&config.db_name);

    let mut conn = MySqlConnection::connect_with(&options).await.map_err(|e| {
        error!(error = %e, "database connection failed");
        LookupError::ConnectionFailed(e)
    })?;

    let result = sqlx::query("SELECT * FROM users WHERE user_id = ?")
        .bind(&user_id)
        .fetch_optional(&mut conn)
        .await;

    // Release the connection before inspecting the query result so every
    // exit path below has already closed it.
    if let Err(e) = conn.close().await {
        warn!(error = %e, "failed to close database connection");
    }

    match result {
        Ok(Some(row)) => Ok(row_to_record(&row)),
        Ok(None) => Err(LookupError::NotFound),
        Err(e) => {
            error!(error = %e, user_id = %user_id, "user lookup query failed");
            Err(LookupError::QueryFailed(e))
        }
    }
}

/// Convert a row into a JSON map, decoding each column by its MySQL type.
fn row_to_record(row: &MySqlRow) -> UserRecord {
    let mut record = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), column_value(row, index));
    }
    record
}

fn column_value(row: &MySqlRow, index: usize) -> Value {
    let type_name = row.columns()[index].type_info().name();
    let value = match type_name {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::from),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|f| Value::from(f as f64)),
        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|t| Value::String(t.to_rfc3339())),
        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|t| Value::String(t.to_string())),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::String(d.to_string())),
        "JSON" => row.try_get::<Option<Value>, _>(index).ok().flatten(),
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String),
    };
    value.unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClaimsError;
    use serde_json::json;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            user: "nobody".to_string(),
            password: "nope".to_string(),
            db_name: "missing".to_string(),
        }
    }

    #[tokio::test]
    async fn test_malformed_event_fails_before_any_connection() {
        let event = json!({ "headers": {} });
        let err = fetch_user_by_id(&unreachable_config(), &event)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LookupError::Claims(ClaimsError::MalformedEvent(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_subject_fails_before_any_connection() {
        let event = json!({
            "requestContext": { "authorizer": { "claims": { "sub": "" } } }
        });
        let err = fetch_user_by_id(&unreachable_config(), &event)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LookupError::Claims(ClaimsError::MissingSubject)
        ));
    }
}
