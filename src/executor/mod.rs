pub mod alter;
pub mod backup;
pub mod constraint;
pub mod create;
pub mod delete;
pub mod describe;
pub mod drop;
pub mod format;
pub mod insert;
pub mod predicate;
pub mod scan;
pub mod select;
pub mod show;
pub mod update;
pub mod use_database;

use std::path::PathBuf;

use crate::{
    config::EngineConfig,
    engine::Session,
    storage::{
        catalog::Catalog,
        paths::DataPaths,
        record::RecordFile,
        schema::{TableSchema, read_schema},
    },
    types::error::{DatabaseError, Result},
};

/// What one statement hands back before it is turned into text.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// A finished `Query OK: ...` line.
    Message(String),
    /// A result set; rendered as a table plus a row count.
    Rows {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// A single-column table without a trailing row count (SHOW, help).
    Listing {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl QueryOutput {
    pub fn ok(message: impl AsRef<str>) -> Self {
        QueryOutput::Message(format!("Query OK: {}", message.as_ref()))
    }

    pub fn render(&self) -> String {
        match self {
            QueryOutput::Message(message) => message.clone(),
            QueryOutput::Rows { rows, .. } if rows.is_empty() => format::rows_returned(0),
            QueryOutput::Rows { headers, rows } => format!(
                "{}\n{}",
                format::format_table(headers, rows),
                format::rows_returned(rows.len())
            ),
            QueryOutput::Listing { headers, rows } => format::format_table(headers, rows),
        }
    }
}

/// Everything a statement may touch: configuration, the catalog and the caller's session.
pub struct ExecutionContext<'a> {
    pub config: &'a EngineConfig,
    pub catalog: &'a Catalog,
    pub session: &'a mut Session,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog, session: &'a mut Session) -> Self {
        Self {
            config,
            catalog,
            session,
        }
    }

    pub fn paths(&self) -> &DataPaths {
        self.catalog.paths()
    }

    pub fn current_database(&self) -> Result<String> {
        self.session
            .current_database
            .clone()
            .ok_or(DatabaseError::NoDatabaseSelected)
    }

    /// Looks a table up in the current database.
    pub fn open_table(&self, name: &str) -> Result<TableHandle> {
        let database = self.current_database()?;
        self.open_table_in(&database, name)
    }

    pub fn open_table_in(&self, database: &str, name: &str) -> Result<TableHandle> {
        let not_found = || DatabaseError::TableNotFound {
            name: name.to_string(),
        };
        let table = self.catalog.find_table(database, name).ok_or_else(not_found)?;
        let handle = TableHandle::new(self.paths(), database, &table);
        if !handle.definition_path.is_file() || !handle.records.path().is_file() {
            return Err(not_found());
        }
        Ok(handle)
    }
}

/// Resolved locations of one existing table.
#[derive(Debug, Clone)]
pub struct TableHandle {
    pub database: String,
    pub name: String,
    pub definition_path: PathBuf,
    pub records: RecordFile,
}

impl TableHandle {
    pub fn new(paths: &DataPaths, database: &str, name: &str) -> Self {
        Self {
            database: database.to_string(),
            name: name.to_string(),
            definition_path: paths.definition_file(database, name),
            records: RecordFile::new(paths.record_file(database, name)),
        }
    }

    pub fn schema(&self) -> Result<TableSchema> {
        read_schema(&self.definition_path, &self.name)
    }
}
