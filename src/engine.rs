//! The root object that embeds the engine: one `Engine` per data directory,
//! one `Session` per caller.

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    executor::{
        ExecutionContext, QueryOutput,
        alter::{AlterExecutor, Alterer},
        backup::{Archiver, BackupExecutor},
        create::{CreateExecutor, DatabaseCreator, TableCreator},
        delete::{DeleteExecutor, Deleter},
        describe::describe_table,
        drop::{DropExecutor, Dropper},
        insert::{Inserter, TableInserter},
        select::{SelectExecutor, Selector},
        show::{show_databases, show_tables},
        update::{UpdateExecutor, Updater},
        use_database::use_database,
    },
    planner::{parser::SqlParser, parser::usage, statement::Statement},
    storage::catalog::Catalog,
    types::error::Result,
};

/// Per-caller state. Replaces any process-wide notion of "the current database".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_database: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(name: impl Into<String>) -> Self {
        Self {
            current_database: Some(name.into()),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
    parser: SqlParser,
    /// Shared by read-only statements, exclusive for anything that rewrites files.
    table_lock: RwLock<()>,
}

impl Engine {
    /// Opens (and if needed initializes) the data directory named by `config`.
    pub fn open(config: EngineConfig) -> Result<Self> {
        let catalog = Catalog::open(&config)?;
        info!(
            "Opened data directory {} with {} databases",
            config.root_path.display(),
            catalog.list_databases().len()
        );
        Ok(Self {
            config,
            catalog,
            parser: SqlParser::new(),
            table_lock: RwLock::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one statement and renders the outcome. Never fails: errors come
    /// back as text starting with `ERROR:`.
    pub fn execute(&self, sql: &str, session: &mut Session) -> String {
        match self.run(sql, session) {
            Ok(output) => output.render(),
            Err(e) => {
                debug!("Statement failed: {}", e);
                format!("ERROR: {}", e)
            }
        }
    }

    /// Parses and executes one statement, returning the structured result.
    pub fn run(&self, sql: &str, session: &mut Session) -> Result<QueryOutput> {
        let statement = self.parser.parse_sql(sql.trim())?;
        debug!("Routing '{}' statement", statement.verb());

        if statement.is_read_only() {
            let _guard = self.table_lock.read();
            self.dispatch(statement, session)
        } else {
            let _guard = self.table_lock.write();
            self.dispatch(statement, session)
        }
    }

    fn dispatch(&self, statement: Statement, session: &mut Session) -> Result<QueryOutput> {
        let mut ctx = ExecutionContext::new(&self.config, &self.catalog, session);

        match statement {
            Statement::Help => Ok(help()),
            Statement::CreateDatabase { name } => CreateExecutor::new(&mut ctx).create_database(&name),
            Statement::CreateTable(create) => CreateExecutor::new(&mut ctx).create_table(&create),
            Statement::DropDatabase { name } => DropExecutor::new(&mut ctx).drop_database(&name),
            Statement::DropTable { name } => DropExecutor::new(&mut ctx).drop_table(&name),
            Statement::Use { name } => use_database(&mut ctx, &name),
            Statement::ShowDatabases => show_databases(&ctx),
            Statement::ShowTables => show_tables(&ctx),
            Statement::Describe { table } => describe_table(&ctx, &table),
            Statement::AlterTable(alter) => AlterExecutor::new(&ctx).alter_table(&alter),
            Statement::Insert(insert) => TableInserter::new(&ctx).insert(&insert),
            Statement::Select(select) => SelectExecutor::new(&ctx).select(&select),
            Statement::Update(update) => UpdateExecutor::new(&ctx).update(&update),
            Statement::Delete(delete) => DeleteExecutor::new(&ctx).delete(&delete),
            Statement::Backup(backup) => BackupExecutor::new(&ctx).backup(&backup),
            Statement::Restore(restore) => BackupExecutor::new(&ctx).restore(&restore),
        }
    }
}

fn help() -> QueryOutput {
    let statements = [
        usage::HELP,
        usage::CREATE_DATABASE,
        usage::DROP,
        usage::USE,
        usage::SHOW,
        usage::CREATE_TABLE,
        usage::DESCRIBE,
        usage::ALTER,
        usage::INSERT,
        usage::SELECT,
        usage::UPDATE,
        usage::DELETE,
        usage::BACKUP,
        usage::RESTORE,
    ];
    QueryOutput::Listing {
        headers: vec!["Supported statements".to_string()],
        rows: statements
            .iter()
            .flat_map(|usage| usage.split(" | "))
            .map(|line| vec![line.to_string()])
            .collect(),
    }
}
