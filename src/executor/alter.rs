use tracing::info;

use crate::{
    executor::{
        ExecutionContext, QueryOutput, TableHandle,
        constraint::{IntegrityChecker, default_field},
        create::validate_schema,
    },
    planner::statement::{AlterAction, AlterTableStatement, ColumnDefinition},
    storage::{
        commit_all,
        schema::{ColumnSchema, TableSchema, stage_schema},
    },
    types::{
        NULL_SENTINEL,
        error::{DatabaseError, Result},
        row::Row,
    },
};

pub trait Alterer {
    fn alter_table(&mut self, statement: &AlterTableStatement) -> Result<QueryOutput>;
}

pub struct AlterExecutor<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> AlterExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }

    /// Appends a column; existing rows take its DEFAULT, or NULL when it has none.
    fn add_column(
        &self,
        handle: &TableHandle,
        mut schema: TableSchema,
        definition: &ColumnDefinition,
    ) -> Result<(TableSchema, Vec<Row>, String)> {
        if schema.get_column(&definition.name).is_some() {
            return Err(DatabaseError::ColumnExists {
                name: definition.name.clone(),
                table: schema.table_name.clone(),
            });
        }
        let column = ColumnSchema::from_definition(definition, schema.width())?;
        let fill = default_field(&column)?.unwrap_or_else(|| NULL_SENTINEL.to_string());
        let name = column.name.clone();
        schema.add_column(column)?;
        validate_schema(self.ctx, &handle.database, &schema)?;

        let mut rows = handle.records.read_rows()?;
        for row in &mut rows {
            row.push(fill.clone());
        }
        self.check_existing(handle, &schema, &rows)?;
        Ok((schema, rows, format!("column '{}' added", name)))
    }

    /// Replaces a column's type and constraints; every stored value must still fit.
    fn modify_column(
        &self,
        handle: &TableHandle,
        mut schema: TableSchema,
        definition: &ColumnDefinition,
    ) -> Result<(TableSchema, Vec<Row>, String)> {
        let position = schema.require_column_index(&definition.name)?;
        let column = ColumnSchema::from_definition(definition, position)?;
        let index = schema.modify_column(column)?;
        validate_schema(self.ctx, &handle.database, &schema)?;

        let rows = handle.records.read_rows()?;
        let column = &schema.columns[index];
        for row in &rows {
            let field = row.get_value(index).unwrap_or(NULL_SENTINEL);
            if !column.data_type.accepts_field(field) {
                return Err(DatabaseError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type.to_string(),
                    actual: format!("stored value '{}'", field),
                });
            }
        }
        self.check_existing(handle, &schema, &rows)?;
        let message = format!("column '{}' modified", column.name);
        Ok((schema, rows, message))
    }

    fn drop_column(
        &self,
        handle: &TableHandle,
        mut schema: TableSchema,
        name: &str,
    ) -> Result<(TableSchema, Vec<Row>, String)> {
        let dropped = schema.require_column_index(name)?;
        let dropped_name = schema.columns[dropped].name.clone();
        let index = schema.drop_column(name)?;
        // Remaining CHECK and self-referencing FOREIGN KEY clauses may name the dropped column.
        validate_schema(self.ctx, &handle.database, &schema)?;

        let mut rows = handle.records.read_rows()?;
        for row in &mut rows {
            row.remove(index);
        }
        Ok((schema, rows, format!("column '{}' dropped", dropped_name)))
    }

    /// Existing rows must satisfy the altered constraints before anything is written.
    fn check_existing(&self, handle: &TableHandle, schema: &TableSchema, rows: &[Row]) -> Result<()> {
        let all: Vec<usize> = (0..rows.len()).collect();
        IntegrityChecker::new(self.ctx, &handle.database, schema).check_update(rows, &all)
    }
}

impl Alterer for AlterExecutor<'_, '_> {
    /// Stages the new definition file and record file, then commits both.
    fn alter_table(&mut self, statement: &AlterTableStatement) -> Result<QueryOutput> {
        let handle = self.ctx.open_table(&statement.table)?;
        let schema = handle.schema()?;

        let (schema, rows, message) = match &statement.action {
            AlterAction::AddColumn(definition) => self.add_column(&handle, schema, definition)?,
            AlterAction::ModifyColumn(definition) => {
                self.modify_column(&handle, schema, definition)?
            }
            AlterAction::DropColumn(name) => self.drop_column(&handle, schema, name)?,
        };

        let staged = vec![
            stage_schema(&handle.definition_path, &schema)?,
            handle.records.stage(&schema, &rows)?,
        ];
        commit_all(staged)?;

        info!("Altered table '{}': {}", handle.name, message);
        Ok(QueryOutput::ok(message))
    }
}
