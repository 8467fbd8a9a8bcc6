use std::fs;

use tracing::{info, warn};

use crate::{
    executor::{
        ExecutionContext, QueryOutput, TableHandle, constraint::default_field,
        predicate::validate_columns,
    },
    planner::statement::CreateTableStatement,
    storage::{
        paths::TableFileKind,
        schema::{TableSchema, write_schema},
    },
    types::{
        error::{DatabaseError, Result},
        is_valid_name,
    },
};

/// Trait for creating databases
pub trait DatabaseCreator {
    fn create_database(&mut self, name: &str) -> Result<QueryOutput>;
}

/// Trait for creating tables in the current database
pub trait TableCreator {
    fn create_table(&mut self, statement: &CreateTableStatement) -> Result<QueryOutput>;

    fn table_exists(&self, name: &str) -> Result<bool>;
}

pub struct CreateExecutor<'a, 'ctx> {
    ctx: &'a mut ExecutionContext<'ctx>,
}

impl<'a, 'ctx> CreateExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a mut ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }
}

/// Checks everything about a table definition that does not touch its own files:
/// a single PRIMARY KEY, CHECK columns, DEFAULT values and FOREIGN KEY targets.
pub fn validate_schema(ctx: &ExecutionContext<'_>, database: &str, schema: &TableSchema) -> Result<()> {
    let primary_keys = schema.columns.iter().filter(|c| c.is_primary_key()).count();
    if primary_keys > 1 {
        return Err(DatabaseError::execution(
            "a table can have at most one PRIMARY KEY column",
        ));
    }

    for column in &schema.columns {
        if let Some(check) = &column.constraints.check {
            validate_columns(check, schema, None)?;
        }
        default_field(column)?;

        if let Some(reference) = &column.constraints.references {
            let target_column = reference.column.as_deref().unwrap_or(&column.name);
            if reference.table.eq_ignore_ascii_case(&schema.table_name) {
                schema.require_column_index(target_column)?;
            } else {
                let target = ctx.open_table_in(database, &reference.table)?;
                target.schema()?.require_column_index(target_column)?;
            }
        }
    }
    Ok(())
}

impl DatabaseCreator for CreateExecutor<'_, '_> {
    fn create_database(&mut self, name: &str) -> Result<QueryOutput> {
        if !is_valid_name(name) || name.eq_ignore_ascii_case(&self.ctx.config.backup_dir) {
            return Err(DatabaseError::InvalidName {
                kind: "database",
                name: name.to_string(),
            });
        }
        if self.ctx.catalog.find_database(name).is_some() {
            return Err(DatabaseError::DatabaseExists {
                name: name.to_string(),
            });
        }

        self.ctx.catalog.add_database(name)?;
        self.ctx.catalog.set_current_database(self.ctx.session, name);
        Ok(QueryOutput::ok(format!("database '{}' created", name)))
    }
}

impl TableCreator for CreateExecutor<'_, '_> {
    fn create_table(&mut self, statement: &CreateTableStatement) -> Result<QueryOutput> {
        let database = self.ctx.current_database()?;
        let table = statement.table.as_str();
        if !is_valid_name(table) {
            return Err(DatabaseError::InvalidName {
                kind: "table",
                name: table.to_string(),
            });
        }
        if self.table_exists(table)? {
            return Err(DatabaseError::TableExists {
                name: table.to_string(),
            });
        }

        let schema = TableSchema::from_definitions(table, &statement.columns)?;
        validate_schema(self.ctx, &database, &schema)?;

        let handle = TableHandle::new(self.ctx.paths(), &database, table);
        let files = self.ctx.paths().table_files(&database, table);
        let created = (|| -> Result<()> {
            for kind in [TableFileKind::Integrity, TableFileKind::Index] {
                fs::File::create(self.ctx.paths().table_file(&database, table, kind))?;
            }
            write_schema(&handle.definition_path, &schema)?;
            handle.records.create(&schema)?;
            self.ctx.catalog.add_table(&database, table)
        })();

        if let Err(e) = created {
            warn!("Rolling back creation of table '{}': {}", table, e);
            for path in &files {
                if path.exists() {
                    let _ = fs::remove_file(path);
                }
            }
            return Err(e);
        }

        info!(
            "Created table '{}' in '{}' with {} columns",
            table,
            database,
            schema.width()
        );
        Ok(QueryOutput::ok(format!("table '{}' created", table)))
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let database = self.ctx.current_database()?;
        Ok(self.ctx.catalog.find_table(&database, name).is_some()
            || self.ctx.paths().definition_file(&database, name).exists())
    }
}
