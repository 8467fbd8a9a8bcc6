use crate::planner::expression::{ColumnRef, Expression};

/// A parsed statement of the dialect, one variant per verb.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Help,
    CreateDatabase { name: String },
    DropDatabase { name: String },
    Use { name: String },
    ShowDatabases,
    ShowTables,
    Describe { table: String },
    CreateTable(CreateTableStatement),
    DropTable { name: String },
    AlterTable(AlterTableStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Backup(BackupStatement),
    Restore(RestoreStatement),
}

impl Statement {
    pub fn verb(&self) -> &'static str {
        match self {
            Statement::Help => "help",
            Statement::CreateDatabase { .. } => "create database",
            Statement::DropDatabase { .. } => "drop database",
            Statement::Use { .. } => "use",
            Statement::ShowDatabases => "show databases",
            Statement::ShowTables => "show tables",
            Statement::Describe { .. } => "describe",
            Statement::CreateTable(_) => "create table",
            Statement::DropTable { .. } => "drop table",
            Statement::AlterTable(_) => "alter table",
            Statement::Insert(_) => "insert",
            Statement::Select(_) => "select",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
            Statement::Backup(_) => "backup database",
            Statement::Restore(_) => "restore database",
        }
    }

    /// Statements that never write table or catalog files.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Statement::Help
                | Statement::Use { .. }
                | Statement::ShowDatabases
                | Statement::ShowTables
                | Statement::Describe { .. }
                | Statement::Select(_)
                | Statement::Backup(_)
        )
    }
}

/// One column of `CREATE TABLE` or `ALTER TABLE ... ADD/MODIFY COLUMN`.
///
/// `type_text` and `constraint_text` are kept verbatim (type upper-cased) because
/// that is what the definition file stores.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_text: String,
    pub constraint_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table: String,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn(ColumnDefinition),
    ModifyColumn(ColumnDefinition),
    DropColumn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub table: String,
    pub action: AlterAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Label used to qualify this table's columns in join output.
    pub fn effective_name(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    /// Whether a column qualifier refers to this table, by alias or by name.
    pub fn answers_to(&self, qualifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(qualifier)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<ColumnRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: TableRef,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub from: TableRef,
    pub join: Option<JoinClause>,
    pub selection: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub selection: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub selection: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackupStatement {
    pub database: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreStatement {
    pub database: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub table: String,
    /// Defaults to the referencing column's own name when omitted.
    pub column: Option<String>,
}

/// Parsed form of a column's constraint text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnConstraints {
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<Expression>,
    pub check: Option<Expression>,
    pub check_text: Option<String>,
    pub references: Option<ForeignKeyRef>,
}
