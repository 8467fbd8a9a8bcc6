use std::path::{Path, PathBuf};

/// Lists every database, one name per line.
pub const DB_DESCRIPTION_FILE: &str = "ruanko.db";
pub const TABLE_DESC_EXTENSION: &str = "tb";
pub const LOG_EXTENSION: &str = "log";

/// The four files every table owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFileKind {
    Definition,
    Record,
    Integrity,
    Index,
}

impl TableFileKind {
    pub const ALL: [TableFileKind; 4] = [
        TableFileKind::Definition,
        TableFileKind::Record,
        TableFileKind::Integrity,
        TableFileKind::Index,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            TableFileKind::Definition => "tdf",
            TableFileKind::Record => "trd",
            TableFileKind::Integrity => "tic",
            TableFileKind::Index => "tid",
        }
    }
}

/// Maps database and table names to their canonical on-disk locations.
///
/// Construction is pure: nothing here touches the filesystem, callers check
/// existence themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_description_file(&self) -> PathBuf {
        self.root.join(DB_DESCRIPTION_FILE)
    }

    pub fn database_dir(&self, db: &str) -> PathBuf {
        self.root.join(db)
    }

    pub fn table_description_file(&self, db: &str) -> PathBuf {
        self.database_dir(db)
            .join(format!("{}.{}", db, TABLE_DESC_EXTENSION))
    }

    pub fn log_file(&self, db: &str) -> PathBuf {
        self.database_dir(db).join(format!("{}.{}", db, LOG_EXTENSION))
    }

    pub fn table_file(&self, db: &str, table: &str, kind: TableFileKind) -> PathBuf {
        self.database_dir(db)
            .join(format!("{}.{}", table, kind.extension()))
    }

    pub fn definition_file(&self, db: &str, table: &str) -> PathBuf {
        self.table_file(db, table, TableFileKind::Definition)
    }

    pub fn record_file(&self, db: &str, table: &str) -> PathBuf {
        self.table_file(db, table, TableFileKind::Record)
    }

    /// Definition, record, integrity and index paths, in that order.
    pub fn table_files(&self, db: &str, table: &str) -> [PathBuf; 4] {
        TableFileKind::ALL.map(|kind| self.table_file(db, table, kind))
    }

    /// Directory holding backup archives; never a database itself.
    pub fn backup_dir(&self, dir_name: &str) -> PathBuf {
        self.root.join(dir_name)
    }
}
