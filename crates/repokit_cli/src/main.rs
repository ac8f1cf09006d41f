//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise one save/find/update/delete cycle against the configured database.
//! - Keep output deterministic `key=value` lines for quick local sanity checks.

use log::info;
use repokit_core::db::{open_db_with_config, Migration};
use repokit_core::model::value::column_uuid;
use repokit_core::{
    core_version, init_logging_from_config, Entity, EntityId, FieldDef, GenericRepository,
    RepoConfig, Repository,
};
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::process::ExitCode;

const SMOKE_MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "CREATE TABLE IF NOT EXISTS smoke_notes (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        word_count INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );",
)];

struct SmokeNote {
    id: Option<EntityId>,
    title: String,
    word_count: i64,
}

impl Entity for SmokeNote {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::value("id"),
            FieldDef::value("title"),
            FieldDef::primitive("wordCount"),
            FieldDef::value("createdAt"),
            FieldDef::value("updatedAt"),
        ];
        FIELDS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(self.word_count),
        ]
    }
}

fn map_smoke_note(row: &Row<'_>) -> rusqlite::Result<SmokeNote> {
    Ok(SmokeNote {
        id: Some(column_uuid(row, "id")?),
        title: row.get("title")?,
        word_count: row.get("word_count")?,
    })
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repokit error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = RepoConfig::from_env()?;
    let file_logging = init_logging_from_config(&config)?;
    println!("repokit version={}", core_version());
    println!("repokit file_logging={file_logging}");

    let conn = open_db_with_config(&config, SMOKE_MIGRATIONS)?;
    let repo = GenericRepository::try_new(&conn, "smoke_notes", map_smoke_note)?;
    println!("repokit columns={}", repo.table_attributes().join(","));

    let draft = SmokeNote {
        id: None,
        title: "smoke".to_string(),
        word_count: 1,
    };
    let mut saved = repo.save(&draft)?;
    let id = saved.id.ok_or("insert returned entity without id")?;
    println!("repokit inserted=true");

    saved.word_count += 1;
    let updated = repo.save(&saved)?;
    println!(
        "repokit updated_title={} updated_word_count={}",
        updated.title, updated.word_count
    );

    let deleted = repo.delete(id)?;
    let still_present = repo.find_by_id(id)?.is_some();
    println!("repokit deleted={deleted} still_present={still_present}");

    info!("event=smoke_cycle module=cli status=ok");
    Ok(())
}
