//! Generic entity repository over a single SQLite table.
//!
//! # Responsibility
//! - Provide find/save/delete APIs for any type implementing `Entity`.
//! - Assemble SELECT/INSERT/UPDATE/DELETE statements from derived columns.
//!
//! # Invariants
//! - `save` inserts with a fresh random id when the entity has none, and
//!   updates by id otherwise.
//! - Writes always re-read the row by id and return the persisted entity.
//! - An empty result is the only read failure converted into `Ok(None)`.
//! - Column names passed to `find_by` are interpolated as-is.

use crate::db::DbError;
use crate::model::entity::{
    is_managed_timestamp, table_attributes, Entity, EntityId, CREATED_AT_COLUMN, ID_COLUMN,
};
use crate::model::value::{now_epoch_ms, uuid_value};
use crate::naming::is_valid_identifier;
use log::{debug, warn};
use rusqlite::types::{ToSql, Value};
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maps one result row into an entity.
pub type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Row was absent when re-read after a write.
    NotFound(EntityId),
    /// A single-row lookup matched several rows.
    IncorrectResultSize {
        table: String,
        expected: usize,
        actual: usize,
    },
    /// Entity supplied a different number of values than attribute columns.
    ValueCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },
    InvalidIdentifier(String),
    MissingTable(String),
    MissingColumn {
        table: String,
        column: String,
    },
    /// Create path received an entity that was already persisted.
    IdAlreadyAssigned(EntityId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::IncorrectResultSize {
                table,
                expected,
                actual,
            } => write!(
                f,
                "incorrect result size from `{table}`: expected {expected}, actual {actual}"
            ),
            Self::ValueCountMismatch {
                table,
                expected,
                actual,
            } => write!(
                f,
                "`{table}` expects {expected} attribute values, got {actual}"
            ),
            Self::InvalidIdentifier(name) => write!(f, "invalid SQL identifier `{name}`"),
            Self::MissingTable(table) => write!(f, "repository requires table `{table}`"),
            Self::MissingColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::IdAlreadyAssigned(id) => write!(f, "entity already has id {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for entity CRUD operations.
pub trait Repository<T> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<T>>;
    fn find_by(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<T>>;
    fn find_all(&self) -> RepoResult<Vec<T>>;
    /// Inserts when `entity.id()` is `None`, updates otherwise.
    fn save(&self, entity: &T) -> RepoResult<T>;
    /// Returns the number of deleted rows.
    fn delete(&self, id: EntityId) -> RepoResult<usize>;
}

/// SQLite-backed repository for one entity table.
pub struct GenericRepository<'conn, T> {
    conn: &'conn Connection,
    table_name: String,
    row_mapper: RowMapper<T>,
    attributes: Vec<String>,
}

impl<'conn, T: Entity> GenericRepository<'conn, T> {
    /// Creates a repository without inspecting the schema.
    pub fn new(
        conn: &'conn Connection,
        table_name: impl Into<String>,
        row_mapper: RowMapper<T>,
    ) -> Self {
        Self {
            conn,
            table_name: table_name.into(),
            row_mapper,
            attributes: table_attributes::<T>(),
        }
    }

    /// Creates a repository after checking the table and every mapped column.
    ///
    /// # Errors
    /// - `InvalidIdentifier` when the table or a derived column is not a plain
    ///   SQL identifier.
    /// - `MissingTable` / `MissingColumn` when the schema does not match.
    pub fn try_new(
        conn: &'conn Connection,
        table_name: impl Into<String>,
        row_mapper: RowMapper<T>,
    ) -> RepoResult<Self> {
        let repo = Self::new(conn, table_name, row_mapper);
        repo.ensure_schema_ready()?;
        Ok(repo)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Derived attribute columns, excluding `id`.
    pub fn table_attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Inserts a row for `id` and returns it as persisted.
    ///
    /// `values` covers every attribute column except managed timestamps,
    /// which receive the current time.
    pub fn insert(&self, id: EntityId, values: Vec<Value>) -> RepoResult<T> {
        let columns: Vec<&str> = std::iter::once(ID_COLUMN)
            .chain(self.attributes.iter().map(String::as_str))
            .collect();
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({})
             VALUES ({placeholders});",
            self.table_name,
            columns.join(", ")
        );

        let mut binds = Vec::with_capacity(columns.len());
        binds.push(uuid_value(id));
        binds.extend(self.bind_attributes(self.attributes.iter(), values)?);

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        debug!(
            "event=repo_insert module=repo status=ok table={} id={} rows={}",
            self.table_name, id, changed
        );

        self.reload(id, "insert")
    }

    /// Updates the row for `id` and returns it as persisted.
    ///
    /// `created_at` is never rewritten; `updated_at` receives the current time.
    pub fn update(&self, id: EntityId, values: Vec<Value>) -> RepoResult<T> {
        let columns: Vec<&String> = self
            .attributes
            .iter()
            .filter(|column| column.as_str() != CREATED_AT_COLUMN)
            .collect();
        let mut binds = self.bind_attributes(columns.iter().copied(), values)?;

        // Nothing to assign; the re-read alone decides between row and NotFound.
        if columns.is_empty() {
            debug!(
                "event=repo_update module=repo status=skipped table={} id={} reason=no_columns",
                self.table_name, id
            );
            return self.reload(id, "update");
        }

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {}
             SET {assignments}
             WHERE {ID_COLUMN} = ?{};",
            self.table_name,
            columns.len() + 1
        );
        binds.push(uuid_value(id));

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        debug!(
            "event=repo_update module=repo status=ok table={} id={} rows={}",
            self.table_name, id, changed
        );

        self.reload(id, "update")
    }

    fn reload(&self, id: EntityId, operation: &str) -> RepoResult<T> {
        match self.find_by_id(id)? {
            Some(entity) => Ok(entity),
            None => {
                warn!(
                    "event=repo_{} module=repo status=error table={} id={} error_code=row_missing_after_write",
                    operation, self.table_name, id
                );
                Err(RepoError::NotFound(id))
            }
        }
    }

    /// Interleaves caller values with managed timestamps in column order.
    fn bind_attributes<'a>(
        &self,
        columns: impl Iterator<Item = &'a String> + Clone,
        values: Vec<Value>,
    ) -> RepoResult<Vec<Value>> {
        let expected = columns
            .clone()
            .filter(|column| !is_managed_timestamp(column))
            .count();
        if values.len() != expected {
            return Err(RepoError::ValueCountMismatch {
                table: self.table_name.clone(),
                expected,
                actual: values.len(),
            });
        }

        let now = now_epoch_ms();
        let mut supplied = values.into_iter();
        let binds = columns
            .filter_map(|column| {
                if is_managed_timestamp(column) {
                    Some(Value::Integer(now))
                } else {
                    supplied.next()
                }
            })
            .collect();
        Ok(binds)
    }

    fn ensure_schema_ready(&self) -> RepoResult<()> {
        if !is_valid_identifier(&self.table_name) {
            return Err(RepoError::InvalidIdentifier(self.table_name.clone()));
        }
        if let Some(column) = self
            .attributes
            .iter()
            .find(|column| !is_valid_identifier(column))
        {
            return Err(RepoError::InvalidIdentifier(column.clone()));
        }

        if !table_exists(self.conn, &self.table_name)? {
            return Err(RepoError::MissingTable(self.table_name.clone()));
        }

        let existing = table_columns(self.conn, &self.table_name)?;
        for column in std::iter::once(ID_COLUMN).chain(self.attributes.iter().map(String::as_str)) {
            if !existing.contains(column) {
                return Err(RepoError::MissingColumn {
                    table: self.table_name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<T: Entity> Repository<T> for GenericRepository<'_, T> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<T>> {
        self.find_by(ID_COLUMN, &id.to_string())
    }

    fn find_by(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<T>> {
        let sql = format!(
            "SELECT *
             FROM {}
             WHERE {column} = ?1;",
            self.table_name
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([value])?;
        let entity = match rows.next()? {
            Some(row) => (self.row_mapper)(row)?,
            None => {
                debug!(
                    "event=repo_find module=repo status=empty table={} column={}",
                    self.table_name, column
                );
                return Ok(None);
            }
        };

        let mut actual = 1;
        while rows.next()?.is_some() {
            actual += 1;
        }
        if actual > 1 {
            return Err(RepoError::IncorrectResultSize {
                table: self.table_name.clone(),
                expected: 1,
                actual,
            });
        }

        Ok(Some(entity))
    }

    fn find_all(&self) -> RepoResult<Vec<T>> {
        let sql = format!("SELECT * FROM {};", self.table_name);
        let mut stmt = self.conn.prepare(&sql)?;
        let entities = stmt
            .query_map([], self.row_mapper)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        debug!(
            "event=repo_find_all module=repo status=ok table={} rows={}",
            self.table_name,
            entities.len()
        );
        Ok(entities)
    }

    fn save(&self, entity: &T) -> RepoResult<T> {
        let values = entity.values();
        match entity.id() {
            None => self.insert(Uuid::new_v4(), values),
            Some(id) => self.update(id, values),
        }
    }

    fn delete(&self, id: EntityId) -> RepoResult<usize> {
        let sql = format!(
            "DELETE FROM {}
             WHERE {ID_COLUMN} = ?1;",
            self.table_name
        );
        let changed = self.conn.execute(&sql, [id.to_string()])?;
        debug!(
            "event=repo_delete module=repo status=ok table={} id={} rows={}",
            self.table_name, id, changed
        );
        Ok(changed)
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = HashSet::new();
    while let Some(row) = rows.next()? {
        columns.insert(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
