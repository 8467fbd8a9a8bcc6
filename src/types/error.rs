use std::path::PathBuf;

use thiserror::Error;

use crate::planner::error::PlannerError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Syntax(#[from] PlannerError),

    #[error("No database selected, run USE <database> first")]
    NoDatabaseSelected,

    #[error("Invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },

    #[error("Database '{name}' does not exist")]
    DatabaseNotFound { name: String },

    #[error("Database '{name}' already exists")]
    DatabaseExists { name: String },

    #[error("Table '{name}' does not exist")]
    TableNotFound { name: String },

    #[error("Table '{name}' already exists")]
    TableExists { name: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Column '{name}' already exists in table '{table}'")]
    ColumnExists { name: String, table: String },

    #[error("Duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Value for column '{column}' is reserved: {reason}")]
    ReservedValue { column: String, reason: String },

    #[error("Primary key conflict, value '{value}' already exists in column '{column}'")]
    PrimaryKeyViolation { column: String, value: String },

    #[error("Primary key column '{column}' cannot be NULL")]
    PrimaryKeyNull { column: String },

    #[error("Column '{column}' cannot be NULL")]
    NotNullViolation { column: String },

    #[error("Unique constraint failed, value '{value}' already exists in column '{column}'")]
    UniqueViolation { column: String, value: String },

    #[error("CHECK constraint failed on column '{column}': {expression}")]
    CheckViolation { column: String, expression: String },

    #[error("Foreign key constraint failed: {table}.{column} has no value '{value}'")]
    ForeignKeyViolation {
        table: String,
        column: String,
        value: String,
    },

    #[error("Malformed schema in {}: {reason}", path.display())]
    MalformedSchema { path: PathBuf, reason: String },

    #[error("Database '{name}' is reserved and cannot be dropped or replaced")]
    ProtectedDatabase { name: String },

    #[error("Database '{name}' is currently in use")]
    DatabaseInUse { name: String },

    #[error("Unable to delete {} (it may be locked by another process)", path.display())]
    DirectoryLocked { path: PathBuf },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Query execution error: {details}")]
    ExecutionError { details: String },
}

impl DatabaseError {
    pub fn execution(details: impl Into<String>) -> Self {
        DatabaseError::ExecutionError {
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
