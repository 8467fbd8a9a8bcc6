use std::path::Path;

use tempfile::TempDir;

use crate::{
    config::EngineConfig,
    engine::{Engine, Session},
    executor::QueryOutput,
    types::error::Result,
};

/// An engine over a throwaway data directory, with one session attached.
/// The directory is removed when the value is dropped.
pub struct TempEngine {
    pub engine: Engine,
    pub session: Session,
    dir: TempDir,
}

impl TempEngine {
    pub fn new() -> Result<Self> {
        Self::with_prefix("ruanko_test")
    }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        let engine = Engine::open(EngineConfig::with_root(dir.path()))?;
        Ok(Self {
            engine,
            session: Session::new(),
            dir,
        })
    }

    /// Creates `database` and makes it current.
    pub fn with_database(prefix: &str, database: &str) -> Result<Self> {
        let mut temp = Self::with_prefix(prefix)?;
        temp.run(&format!("CREATE DATABASE {};", database))?;
        Ok(temp)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Rendered result text, exactly as an interactive caller would see it.
    pub fn execute(&mut self, sql: &str) -> String {
        self.engine.execute(sql, &mut self.session)
    }

    pub fn run(&mut self, sql: &str) -> Result<QueryOutput> {
        self.engine.run(sql, &mut self.session)
    }

    /// Runs every statement, stopping at the first failure.
    pub fn run_all(&mut self, statements: &[&str]) -> Result<()> {
        for sql in statements {
            self.run(sql)?;
        }
        Ok(())
    }

    /// Rows of a SELECT, without headers.
    pub fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        match self.run(sql)? {
            QueryOutput::Rows { rows, .. } | QueryOutput::Listing { rows, .. } => Ok(rows),
            QueryOutput::Message(_) => Ok(Vec::new()),
        }
    }
}
