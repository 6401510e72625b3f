// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use botica_app::{Drug, DrugId};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "botica";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "drugs",
    &[
        "id",
        "name",
        "description",
        "category",
        "interactions",
        "created_at",
        "updated_at",
    ],
)];

struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[RequiredIndex {
    name: "idx_drugs_name",
    create_sql: "CREATE INDEX IF NOT EXISTS idx_drugs_name ON drugs (name COLLATE NOCASE);",
}];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrug {
    pub name: String,
    pub description: String,
    pub category: String,
    pub interactions: Option<String>,
}

#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn insert_drug(&self, drug: &NewDrug) -> Result<DrugId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO drugs (name, description, category, interactions, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
                params![
                    drug.name,
                    drug.description,
                    drug.category,
                    drug.interactions,
                    now,
                    now
                ],
            )
            .context("insert drug")?;
        Ok(DrugId::new(self.conn.last_insert_rowid()))
    }

    pub fn get_drug(&self, drug_id: DrugId) -> Result<Drug> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, name, description, category, interactions, created_at, updated_at
                FROM drugs
                WHERE id = ?
                ",
            )
            .context("prepare drug lookup")?;
        stmt.query_row(params![drug_id.get()], map_drug_row)
            .with_context(|| format!("load drug {}", drug_id.get()))
    }

    pub fn search_drugs(&self, filter: &str) -> Result<Vec<Drug>> {
        let pattern = like_pattern(filter);
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, name, description, category, interactions, created_at, updated_at
                FROM drugs
                WHERE name LIKE ? ESCAPE '\\'
                ORDER BY name COLLATE NOCASE ASC, id ASC
                ",
            )
            .context("prepare drugs query")?;
        let rows = stmt
            .query_map(params![pattern], map_drug_row)
            .context("query drugs")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect drugs")
    }
}

fn map_drug_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Drug> {
    let created_at_raw: String = row.get(5)?;
    let updated_at_raw: String = row.get(6)?;
    Ok(Drug {
        id: DrugId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        interactions: row.get(4)?,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
    })
}

// Wildcards in the filter must match literally; the query carries ESCAPE '\'.
fn like_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for ch in filter.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point BOTICA_DB_PATH at a botica database or remove the file to recreate it"
            );
        }
        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            params![table],
            |row| row.get(0),
        )
        .with_context(|| format!("check table `{table}`"))?;
    Ok(count > 0)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let sql = format!("PRAGMA table_info({table})");
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("inspect table `{table}`"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("read columns for `{table}`"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for `{table}`"))
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    let existing = index_names(conn)?;
    for index in REQUIRED_INDEXES {
        if !existing.contains(index.name) {
            conn.execute_batch(index.create_sql)
                .with_context(|| format!("create index `{}`", index.name))?;
        }
    }
    Ok(())
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index'")
        .context("prepare index query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query indexes")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect indexes")
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("BOTICA_DB_PATH") {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set BOTICA_DB_PATH to a writable database path")
    })?;
    let app_dir = base.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("botica.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }
    if let Some(position) = path.find("://") {
        let scheme = &path[..position];
        if !scheme.is_empty() && scheme.chars().all(|ch| ch.is_ascii_alphabetic()) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }
    if path.starts_with("file:") {
        bail!("database path {path:?} uses the sqlite URI syntax; pass a plain filesystem path");
    }
    if path.contains('?') {
        bail!("database path {path:?} contains a query string; pass a plain filesystem path");
    }
    Ok(())
}

pub fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

pub fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(parsed);
    }
    let formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];
    for format in formats {
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, format) {
            return Ok(parsed.assume_utc());
        }
    }
    bail!("unsupported datetime format {raw:?}")
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        Box::new(io::Error::new(io::ErrorKind::InvalidData, error.to_string())),
    )
}
