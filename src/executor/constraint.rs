use std::collections::HashMap;

use crate::{
    executor::{
        ExecutionContext,
        predicate::{NoColumns, Predicate, SchemaRow, evaluate},
    },
    storage::schema::{ColumnSchema, TableSchema},
    types::{
        NULL_SENTINEL,
        error::{DatabaseError, Result},
        is_null_sentinel,
        row::Row,
    },
};

/// Stored text of a column's DEFAULT, or `None` when it has none.
pub fn default_field(column: &ColumnSchema) -> Result<Option<String>> {
    let Some(expression) = &column.constraints.default else {
        return Ok(None);
    };
    let value = evaluate(expression, &NoColumns)?;
    column.data_type.coerce(&column.name, &value).map(Some)
}

/// Enforces the declared constraints of one table against candidate rows.
pub struct IntegrityChecker<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
    database: &'a str,
    schema: &'a TableSchema,
}

impl<'a, 'ctx> IntegrityChecker<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>, database: &'a str, schema: &'a TableSchema) -> Self {
        Self {
            ctx,
            database,
            schema,
        }
    }

    /// Whether any column needs the existing rows to be checked.
    pub fn needs_existing_rows(&self) -> bool {
        self.schema
            .columns
            .iter()
            .any(|c| c.is_primary_key() || c.is_unique())
    }

    /// Checks a new row in order: PRIMARY KEY, NOT NULL, UNIQUE, CHECK, FOREIGN KEY.
    pub fn check_insert(&self, row: &Row, existing: &[Row]) -> Result<()> {
        for (index, column) in self.schema.columns.iter().enumerate() {
            if !column.is_primary_key() {
                continue;
            }
            let value = field_at(row, index);
            if is_null_sentinel(value) {
                return Err(DatabaseError::PrimaryKeyNull {
                    column: column.name.clone(),
                });
            }
            if existing.iter().any(|other| field_at(other, index) == value) {
                return Err(DatabaseError::PrimaryKeyViolation {
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        self.check_not_null(row)?;

        for (index, column) in self.schema.columns.iter().enumerate() {
            if !column.is_unique() || column.is_primary_key() {
                continue;
            }
            let value = field_at(row, index);
            if !is_null_sentinel(value) && existing.iter().any(|other| field_at(other, index) == value) {
                return Err(DatabaseError::UniqueViolation {
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        self.check_conditions(row)?;
        self.check_foreign_keys(row)
    }

    /// Checks rows rewritten by an UPDATE against the final contents of the table.
    pub fn check_update(&self, rows: &[Row], changed: &[usize]) -> Result<()> {
        for &row_index in changed {
            let row = &rows[row_index];
            for (index, column) in self.schema.columns.iter().enumerate() {
                if column.is_primary_key() && is_null_sentinel(field_at(row, index)) {
                    return Err(DatabaseError::PrimaryKeyNull {
                        column: column.name.clone(),
                    });
                }
            }
            self.check_not_null(row)?;
        }

        for (index, column) in self.schema.columns.iter().enumerate() {
            if !(column.is_primary_key() || column.is_unique()) {
                continue;
            }
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for row in rows {
                let value = field_at(row, index);
                if !is_null_sentinel(value) {
                    *counts.entry(value).or_default() += 1;
                }
            }
            for &row_index in changed {
                let value = field_at(&rows[row_index], index);
                if counts.get(value).copied().unwrap_or(0) > 1 {
                    return Err(if column.is_primary_key() {
                        DatabaseError::PrimaryKeyViolation {
                            column: column.name.clone(),
                            value: value.to_string(),
                        }
                    } else {
                        DatabaseError::UniqueViolation {
                            column: column.name.clone(),
                            value: value.to_string(),
                        }
                    });
                }
            }
        }

        for &row_index in changed {
            self.check_conditions(&rows[row_index])?;
            self.check_foreign_keys(&rows[row_index])?;
        }
        Ok(())
    }

    fn check_not_null(&self, row: &Row) -> Result<()> {
        for (index, column) in self.schema.columns.iter().enumerate() {
            if column.is_not_null() && is_null_sentinel(field_at(row, index)) {
                return Err(DatabaseError::NotNullViolation {
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// CHECK conditions are skipped when the column itself is NULL.
    fn check_conditions(&self, row: &Row) -> Result<()> {
        for (index, column) in self.schema.columns.iter().enumerate() {
            let Some(check) = &column.constraints.check else {
                continue;
            };
            if is_null_sentinel(field_at(row, index)) {
                continue;
            }
            let passed = Predicate::new(check.clone()).evaluate(&SchemaRow::new(self.schema, row))?;
            if !passed {
                return Err(DatabaseError::CheckViolation {
                    column: column.name.clone(),
                    expression: column
                        .constraints
                        .check_text
                        .clone()
                        .unwrap_or_else(|| column.constraint_text.clone()),
                });
            }
        }
        Ok(())
    }

    /// NULL foreign keys are allowed; anything else must exist in the referenced column.
    fn check_foreign_keys(&self, row: &Row) -> Result<()> {
        for (index, column) in self.schema.columns.iter().enumerate() {
            let Some(reference) = &column.constraints.references else {
                continue;
            };
            let value = field_at(row, index);
            if is_null_sentinel(value) {
                continue;
            }

            let target_column = reference.column.as_deref().unwrap_or(&column.name);
            let handle = self.ctx.open_table_in(self.database, &reference.table)?;
            let target_schema = handle.schema()?;
            let target_index = target_schema.require_column_index(target_column)?;

            let mut found = false;
            for other in handle.records.reader()? {
                if field_at(&other?, target_index) == value {
                    found = true;
                    break;
                }
            }
            if !found {
                return Err(DatabaseError::ForeignKeyViolation {
                    table: handle.name.clone(),
                    column: target_schema.columns[target_index].name.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn field_at(row: &Row, index: usize) -> &str {
    row.get_value(index).unwrap_or(NULL_SENTINEL)
}
