use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    engine::Session,
    storage::{StagedFile, paths::DataPaths},
    types::error::{DatabaseError, Result},
};

/// Change notifications emitted after a catalog mutation succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    DatabaseCreated(String),
    DatabaseDropped(String),
    TableCreated { database: String, table: String },
    TableDropped { database: String, table: String },
    CurrentDatabaseChanged(String),
    Refreshed,
}

pub trait CatalogListener: Send + Sync {
    fn on_catalog_changed(&self, event: &CatalogEvent);
}

/// One line of a table description file: `name|tdf|trd|tic|tid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub files: [PathBuf; 4],
}

impl TableEntry {
    pub fn new(paths: &DataPaths, database: &str, table: &str) -> Self {
        Self {
            name: table.to_string(),
            files: paths.table_files(database, table),
        }
    }

    pub fn to_line(&self) -> String {
        let mut fields = vec![self.name.clone()];
        fields.extend(self.files.iter().map(|p| p.display().to_string()));
        fields.join("|")
    }

    /// Only the name is trusted; file locations always come from `DataPaths`.
    pub fn name_from_line(line: &str) -> Option<&str> {
        let name = line.split('|').next()?.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Registry of databases and their tables, mirrored in `ruanko.db` and `<db>/<db>.tb`.
///
/// Every mutation takes the state lock for its whole read-modify-write cycle,
/// so two callers never interleave writes to a description file.
pub struct Catalog {
    paths: DataPaths,
    system_database: String,
    backup_dir: String,
    drop_retry_attempts: u32,
    drop_retry_delay: Duration,
    state: Mutex<BTreeMap<String, Vec<String>>>,
    listeners: Mutex<Vec<Arc<dyn CatalogListener>>>,
}

impl Catalog {
    /// Creates the root layout and the system database if missing, then loads the registry.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let catalog = Self {
            paths: config.paths(),
            system_database: config.system_database.clone(),
            backup_dir: config.backup_dir.clone(),
            drop_retry_attempts: config.drop_retry_attempts.max(1),
            drop_retry_delay: config.drop_retry_delay(),
            state: Mutex::new(BTreeMap::new()),
            listeners: Mutex::new(Vec::new()),
        };

        fs::create_dir_all(catalog.paths.root())?;
        let db_file = catalog.paths.db_description_file();
        if !db_file.exists() {
            fs::File::create(&db_file)?;
        }
        let system = catalog.system_database.clone();
        if catalog.paths.database_dir(&system).is_dir() {
            catalog.restore_missing_files(&system)?;
        } else {
            info!("Initializing system database '{}'", system);
            catalog.add_database(&system)?;
        }

        catalog.refresh()?;
        Ok(catalog)
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn system_database(&self) -> &str {
        &self.system_database
    }

    pub fn subscribe(&self, listener: Arc<dyn CatalogListener>) {
        self.listeners.lock().push(listener);
    }

    fn notify(&self, event: CatalogEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_catalog_changed(&event);
        }
    }

    /// System database first, then every other database by name.
    pub fn list_databases(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut names = vec![self.system_database.clone()];
        names.extend(
            state
                .keys()
                .filter(|name| !name.eq_ignore_ascii_case(&self.system_database))
                .cloned(),
        );
        names
    }

    /// A database exists iff its directory and table description file both exist.
    pub fn database_exists(&self, name: &str) -> bool {
        self.paths.database_dir(name).is_dir() && self.paths.table_description_file(name).is_file()
    }

    /// Registered spelling of a database name, matched case-insensitively.
    pub fn find_database(&self, name: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .keys()
            .find(|db| db.eq_ignore_ascii_case(name))
            .cloned()
            .or_else(|| self.database_exists(name).then(|| name.to_string()))
    }

    pub fn list_tables(&self, database: &str) -> Vec<String> {
        self.state.lock().get(database).cloned().unwrap_or_default()
    }

    /// Registered spelling of a table name, matched case-insensitively.
    pub fn find_table(&self, database: &str, table: &str) -> Option<String> {
        self.state
            .lock()
            .get(database)
            .and_then(|tables| tables.iter().find(|t| t.eq_ignore_ascii_case(table)).cloned())
    }

    /// Points the session at `name` if it is a valid database.
    pub fn set_current_database(&self, session: &mut Session, name: &str) -> bool {
        let Some(name) = self.find_database(name) else {
            return false;
        };
        if !self.database_exists(&name) {
            return false;
        }
        session.current_database = Some(name.clone());
        debug!("Current database is now '{}'", name);
        self.notify(CatalogEvent::CurrentDatabaseChanged(name));
        true
    }

    /// Creates `<db>/`, `<db>.tb` and `<db>.log` and registers the database.
    /// Anything created before a failure is removed again.
    pub fn add_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        let dir = self.paths.database_dir(name);
        if dir.exists() {
            return Err(DatabaseError::DatabaseExists {
                name: name.to_string(),
            });
        }

        let created = (|| -> Result<()> {
            fs::create_dir(&dir)?;
            fs::File::create(self.paths.table_description_file(name))?;
            fs::File::create(self.paths.log_file(name))?;
            self.append_line(&self.paths.db_description_file(), name)
        })();

        if let Err(e) = created {
            warn!("Rolling back creation of database '{}': {}", name, e);
            if dir.exists() {
                let _ = fs::remove_dir_all(&dir);
            }
            return Err(e);
        }

        state.insert(name.to_string(), Vec::new());
        drop(state);
        info!("Created database '{}'", name);
        self.notify(CatalogEvent::DatabaseCreated(name.to_string()));
        Ok(())
    }

    /// Recreates the description and log files of a database whose directory
    /// is still there. Tables listed in a lost `.tb` are not recovered.
    fn restore_missing_files(&self, name: &str) -> Result<()> {
        for path in [self.paths.table_description_file(name), self.paths.log_file(name)] {
            if !path.is_file() {
                warn!("Recreating missing {}", path.display());
                fs::File::create(&path)?;
            }
        }
        Ok(())
    }

    /// Deletes the database directory, retrying to ride out transient locks,
    /// then removes it from `ruanko.db`.
    pub fn remove_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        let dir = self.paths.database_dir(name);

        let mut attempt = 0;
        while dir.exists() {
            attempt += 1;
            match fs::remove_dir_all(&dir) {
                Ok(()) => break,
                Err(e) if attempt < self.drop_retry_attempts => {
                    warn!(
                        "Deleting {} failed (attempt {}/{}): {}",
                        dir.display(),
                        attempt,
                        self.drop_retry_attempts,
                        e
                    );
                    thread::sleep(self.drop_retry_delay);
                }
                Err(e) => {
                    warn!("Giving up on deleting {}: {}", dir.display(), e);
                    return Err(DatabaseError::DirectoryLocked { path: dir });
                }
            }
        }

        self.remove_line(&self.paths.db_description_file(), |line| {
            line.trim().eq_ignore_ascii_case(name)
        })?;
        state.remove(name);
        drop(state);
        info!("Dropped database '{}'", name);
        self.notify(CatalogEvent::DatabaseDropped(name.to_string()));
        Ok(())
    }

    pub fn add_table(&self, database: &str, table: &str) -> Result<()> {
        let mut state = self.state.lock();
        let entry = TableEntry::new(&self.paths, database, table);
        self.append_line(&self.paths.table_description_file(database), &entry.to_line())?;
        state
            .entry(database.to_string())
            .or_default()
            .push(table.to_string());
        drop(state);
        info!("Registered table '{}' in database '{}'", table, database);
        self.notify(CatalogEvent::TableCreated {
            database: database.to_string(),
            table: table.to_string(),
        });
        Ok(())
    }

    pub fn remove_table(&self, database: &str, table: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.remove_line(&self.paths.table_description_file(database), |line| {
            TableEntry::name_from_line(line).is_some_and(|name| name.eq_ignore_ascii_case(table))
        })?;
        if let Some(tables) = state.get_mut(database) {
            tables.retain(|t| !t.eq_ignore_ascii_case(table));
        }
        drop(state);
        info!("Unregistered table '{}' from database '{}'", table, database);
        self.notify(CatalogEvent::TableDropped {
            database: database.to_string(),
            table: table.to_string(),
        });
        Ok(())
    }

    /// Rebuilds the registry from the file system. Needed after anything outside
    /// the engine changes database directories, such as a restore.
    pub fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mut databases = BTreeMap::new();

        for entry in fs::read_dir(self.paths.root())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.eq_ignore_ascii_case(&self.backup_dir) || !self.database_exists(&name) {
                continue;
            }
            let tables = self.load_tables(&name)?;
            databases.insert(name, tables);
        }

        self.sync_description_file(&databases)?;
        debug!("Catalog refreshed with {} databases", databases.len());
        *state = databases;
        drop(state);
        self.notify(CatalogEvent::Refreshed);
        Ok(())
    }

    fn load_tables(&self, database: &str) -> Result<Vec<String>> {
        let content = fs::read_to_string(self.paths.table_description_file(database))?;
        Ok(content
            .lines()
            .filter_map(TableEntry::name_from_line)
            .map(str::to_string)
            .collect())
    }

    /// Keeps `ruanko.db` listing exactly the databases found on disk, in its existing order.
    fn sync_description_file(&self, databases: &BTreeMap<String, Vec<String>>) -> Result<()> {
        let path = self.paths.db_description_file();
        let content = fs::read_to_string(&path).unwrap_or_default();
        let listed: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        let mut synced: Vec<&str> = listed
            .iter()
            .copied()
            .filter(|name| databases.contains_key(*name))
            .collect();
        for name in databases.keys() {
            if !synced.contains(&name.as_str()) {
                synced.push(name.as_str());
            }
        }

        if synced != listed {
            StagedFile::write_lines(&path, synced)?.commit()?;
        }
        Ok(())
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn remove_line<F>(&self, path: &Path, matches: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        let content = fs::read_to_string(path)?;
        let kept: Vec<&str> = content.lines().filter(|line| !matches(line)).collect();
        StagedFile::write_lines(path, kept)?.commit()
    }
}
