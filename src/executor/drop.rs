use std::fs;

use tracing::info;

use crate::{
    executor::{ExecutionContext, QueryOutput},
    types::error::{DatabaseError, Result},
};

pub trait Dropper {
    fn drop_database(&mut self, name: &str) -> Result<QueryOutput>;

    fn drop_table(&mut self, name: &str) -> Result<QueryOutput>;
}

pub struct DropExecutor<'a, 'ctx> {
    ctx: &'a mut ExecutionContext<'ctx>,
}

impl<'a, 'ctx> DropExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a mut ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }
}

impl Dropper for DropExecutor<'_, '_> {
    fn drop_database(&mut self, name: &str) -> Result<QueryOutput> {
        if self.ctx.config.is_reserved_database(name) {
            return Err(DatabaseError::ProtectedDatabase {
                name: name.to_string(),
            });
        }
        let name = self
            .ctx
            .catalog
            .find_database(name)
            .ok_or_else(|| DatabaseError::DatabaseNotFound {
                name: name.to_string(),
            })?;
        let in_use = self
            .ctx
            .session
            .current_database
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(&name));
        if in_use {
            return Err(DatabaseError::DatabaseInUse { name });
        }

        self.ctx.catalog.remove_database(&name)?;
        Ok(QueryOutput::ok(format!("database '{}' dropped", name)))
    }

    fn drop_table(&mut self, name: &str) -> Result<QueryOutput> {
        let database = self.ctx.current_database()?;
        let table = self
            .ctx
            .catalog
            .find_table(&database, name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: name.to_string(),
            })?;

        for path in self.ctx.paths().table_files(&database, &table) {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        self.ctx.catalog.remove_table(&database, &table)?;

        info!("Dropped table '{}' from '{}'", table, database);
        Ok(QueryOutput::ok(format!("table '{}' dropped", table)))
    }
}
