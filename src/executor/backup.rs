use std::{fs, path::PathBuf};

use tracing::{info, warn};

use crate::{
    executor::{ExecutionContext, QueryOutput},
    planner::statement::{BackupStatement, RestoreStatement},
    storage::backup::{archive_directory, extract_archive},
    types::{
        error::{DatabaseError, Result},
        is_valid_name,
    },
};

pub trait Archiver {
    fn backup(&mut self, statement: &BackupStatement) -> Result<QueryOutput>;

    fn restore(&mut self, statement: &RestoreStatement) -> Result<QueryOutput>;
}

pub struct BackupExecutor<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> BackupExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }

    /// `<root>/<backup_dir>/<database>.zip`
    fn default_archive(&self, database: &str) -> PathBuf {
        self.ctx
            .paths()
            .backup_dir(&self.ctx.config.backup_dir)
            .join(format!("{}.zip", database))
    }
}

impl Archiver for BackupExecutor<'_, '_> {
    fn backup(&mut self, statement: &BackupStatement) -> Result<QueryOutput> {
        let requested = match &statement.database {
            Some(name) => name.clone(),
            None => self.ctx.current_database()?,
        };
        let database = self
            .ctx
            .catalog
            .find_database(&requested)
            .ok_or(DatabaseError::DatabaseNotFound { name: requested })?;

        let target = statement
            .target
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_archive(&database));
        let files = archive_directory(&self.ctx.paths().database_dir(&database), &target)?;

        info!("Backed up '{}' to {} ({} files)", database, target.display(), files);
        Ok(QueryOutput::ok(format!(
            "database '{}' backed up to '{}' ({} files)",
            database,
            target.display(),
            files
        )))
    }

    /// Replaces the database directory with the archive's contents, then
    /// rebuilds the catalog from disk.
    fn restore(&mut self, statement: &RestoreStatement) -> Result<QueryOutput> {
        let source = PathBuf::from(&statement.source);
        if !source.is_file() {
            return Err(DatabaseError::execution(format!(
                "backup archive '{}' not found",
                source.display()
            )));
        }

        let requested = match &statement.database {
            Some(name) => name.clone(),
            None => source
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    DatabaseError::execution(format!(
                        "cannot derive a database name from '{}'",
                        source.display()
                    ))
                })?,
        };
        if !is_valid_name(&requested) {
            return Err(DatabaseError::InvalidName {
                kind: "database",
                name: requested,
            });
        }
        if self.ctx.config.is_reserved_database(&requested) {
            return Err(DatabaseError::ProtectedDatabase { name: requested });
        }

        let database = self
            .ctx
            .catalog
            .find_database(&requested)
            .unwrap_or(requested);
        let in_use = self
            .ctx
            .session
            .current_database
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(&database));
        if in_use {
            return Err(DatabaseError::DatabaseInUse { name: database });
        }

        let dir = self.ctx.paths().database_dir(&database);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        let files = extract_archive(&source, &dir)?;

        if !self.ctx.paths().table_description_file(&database).is_file() {
            warn!(
                "Archive {} holds no '{}.tb', removing the restored directory",
                source.display(),
                database
            );
            let _ = fs::remove_dir_all(&dir);
            self.ctx.catalog.refresh()?;
            return Err(DatabaseError::execution(format!(
                "archive '{}' is not a backup of database '{}'",
                source.display(),
                database
            )));
        }

        self.ctx.catalog.refresh()?;
        info!("Restored '{}' from {} ({} files)", database, source.display(), files);
        Ok(QueryOutput::ok(format!(
            "database '{}' restored from '{}'",
            database,
            source.display()
        )))
    }
}
