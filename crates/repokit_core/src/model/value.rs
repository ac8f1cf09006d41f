//! Conversions between entity data and SQLite values.

use crate::model::entity::EntityId;
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Encodes an identifier as canonical hyphenated UUID text.
pub fn uuid_value(id: EntityId) -> Value {
    Value::Text(id.to_string())
}

/// Encodes an optional identifier, mapping `None` to SQL `NULL`.
pub fn optional_uuid_value(id: Option<EntityId>) -> Value {
    id.map_or(Value::Null, uuid_value)
}

/// Reads a non-null UUID text column.
pub fn column_uuid(row: &Row<'_>, column: &str) -> rusqlite::Result<EntityId> {
    let text: String = row.get(column)?;
    parse_uuid_column(row, column, &text)
}

/// Reads a nullable UUID text column.
pub fn column_optional_uuid(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<EntityId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse_uuid_column(row, column, &text).map(Some),
        None => Ok(None),
    }
}

/// Returns the current time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn parse_uuid_column(row: &Row<'_>, column: &str, text: &str) -> rusqlite::Result<EntityId> {
    Uuid::parse_str(text).map_err(|err| {
        let index = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
    })
}

#[cfg(test)]
mod tests {
    use super::{column_optional_uuid, column_uuid, now_epoch_ms, optional_uuid_value, uuid_value};
    use rusqlite::types::Value;
    use rusqlite::Connection;
    use uuid::Uuid;

    #[test]
    fn uuid_values_are_text_or_null() {
        let id = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
        assert_eq!(
            uuid_value(id),
            Value::Text("00000000-0000-4000-8000-000000000001".to_string())
        );
        assert_eq!(optional_uuid_value(None), Value::Null);
    }

    #[test]
    fn uuid_columns_parse_or_report_conversion_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let (good, missing) = conn
            .query_row(
                "SELECT '00000000-0000-4000-8000-000000000002' AS id, NULL AS parent_id;",
                [],
                |row| Ok((column_uuid(row, "id")?, column_optional_uuid(row, "parent_id")?)),
            )
            .unwrap();
        assert_eq!(good.to_string(), "00000000-0000-4000-8000-000000000002");
        assert!(missing.is_none());

        let err = conn
            .query_row("SELECT 'not-a-uuid' AS id;", [], |row| column_uuid(row, "id"))
            .unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(0, _, _)
        ));
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }
}
