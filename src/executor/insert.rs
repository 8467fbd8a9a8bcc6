use std::collections::HashSet;

use tracing::debug;

use crate::{
    executor::{
        ExecutionContext, QueryOutput,
        constraint::{IntegrityChecker, default_field},
        predicate::{NoColumns, evaluate},
    },
    planner::statement::InsertStatement,
    types::{
        error::{DatabaseError, Result},
        row::Row,
    },
};

/// Trait for inserting data into database tables
pub trait Inserter {
    fn insert(&mut self, statement: &InsertStatement) -> Result<QueryOutput>;
}

pub struct TableInserter<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> TableInserter<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }
}

impl Inserter for TableInserter<'_, '_> {
    /// Builds a full-width row (unnamed columns take their DEFAULT or NULL),
    /// coerces every value to its column type, checks constraints, then appends.
    fn insert(&mut self, statement: &InsertStatement) -> Result<QueryOutput> {
        let handle = self.ctx.open_table(&statement.table)?;
        let schema = handle.schema()?;

        let targets: Vec<usize> = match &statement.columns {
            Some(columns) => {
                if columns.len() != statement.values.len() {
                    return Err(DatabaseError::execution(format!(
                        "{} columns named but {} values given",
                        columns.len(),
                        statement.values.len()
                    )));
                }
                let mut seen = HashSet::new();
                let mut targets = Vec::with_capacity(columns.len());
                for name in columns {
                    let index = schema.require_column_index(name)?;
                    if !seen.insert(index) {
                        return Err(DatabaseError::DuplicateColumn { name: name.clone() });
                    }
                    targets.push(index);
                }
                targets
            }
            None => {
                if statement.values.len() != schema.width() {
                    return Err(DatabaseError::execution(format!(
                        "table '{}' has {} columns but {} values were given",
                        schema.table_name,
                        schema.width(),
                        statement.values.len()
                    )));
                }
                (0..schema.width()).collect()
            }
        };

        let mut row = Row::nulls(schema.width());
        for (index, column) in schema.columns.iter().enumerate() {
            if !targets.contains(&index) {
                if let Some(default) = default_field(column)? {
                    row.set_value(index, default)?;
                }
            }
        }
        for (&index, expression) in targets.iter().zip(&statement.values) {
            let column = &schema.columns[index];
            let value = evaluate(expression, &NoColumns)?;
            row.set_value(index, column.data_type.coerce(&column.name, &value)?)?;
        }

        let database = handle.database.clone();
        let checker = IntegrityChecker::new(self.ctx, &database, &schema);
        let existing = if checker.needs_existing_rows() {
            handle.records.read_rows()?
        } else {
            Vec::new()
        };
        checker.check_insert(&row, &existing)?;

        handle.records.append(&row)?;
        debug!("Inserted a row into '{}'", handle.name);
        Ok(QueryOutput::ok("1 row inserted"))
    }
}
