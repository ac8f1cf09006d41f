#![allow(dead_code)]

use repokit_core::db::{open_db_in_memory, Migration};
use repokit_core::model::value::{column_optional_uuid, column_uuid, optional_uuid_value};
use repokit_core::{Entity, EntityId, FieldDef};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

pub const LIBRARY_SCHEMA: &str = "
CREATE TABLE authors (
    id TEXT PRIMARY KEY NOT NULL,
    full_name TEXT NOT NULL,
    birth_year INTEGER
);

CREATE TABLE books (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    page_count INTEGER NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 0,
    author_id TEXT REFERENCES authors(id),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
";

pub const LIBRARY_INDEXES: &str = "
CREATE INDEX idx_books_author_id ON books(author_id);
";

pub const MIGRATIONS: &[Migration] = &[
    Migration::new(1, LIBRARY_SCHEMA),
    Migration::new(2, LIBRARY_INDEXES),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Option<EntityId>,
    pub full_name: String,
    pub birth_year: Option<i64>,
}

impl Author {
    pub fn new(full_name: &str, birth_year: Option<i64>) -> Self {
        Self {
            id: None,
            full_name: full_name.to_string(),
            birth_year,
        }
    }
}

impl Entity for Author {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::value("id"),
            FieldDef::value("fullName"),
            FieldDef::primitive("birthYear"),
        ];
        FIELDS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.full_name.clone()),
            Value::from(self.birth_year),
        ]
    }
}

pub fn map_author(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: Some(column_uuid(row, "id")?),
        full_name: row.get("full_name")?,
        birth_year: row.get("birth_year")?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Option<EntityId>,
    pub title: String,
    pub page_count: i64,
    pub is_published: bool,
    pub author_id: Option<EntityId>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Book {
    pub fn new(title: &str, page_count: i64, author_id: Option<EntityId>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            page_count,
            is_published: false,
            author_id,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Book {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::value("id"),
            FieldDef::value("title"),
            FieldDef::primitive("pageCount"),
            FieldDef::primitive("isPublished"),
            FieldDef::reference("author"),
            FieldDef::value("createdAt"),
            FieldDef::value("updatedAt"),
        ];
        FIELDS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(self.page_count),
            Value::from(self.is_published),
            optional_uuid_value(self.author_id),
        ]
    }
}

pub fn map_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(column_uuid(row, "id")?),
        title: row.get("title")?,
        page_count: row.get("page_count")?,
        is_published: row.get("is_published")?,
        author_id: column_optional_uuid(row, "author_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn library_db() -> Connection {
    open_db_in_memory(MIGRATIONS).unwrap()
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
