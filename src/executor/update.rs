use tracing::debug;

use crate::{
    executor::{
        ExecutionContext, QueryOutput,
        constraint::IntegrityChecker,
        predicate::{Predicate, SchemaRow, evaluate, validate_columns},
    },
    planner::statement::UpdateStatement,
    types::{
        error::{DatabaseError, Result},
        row::Row,
    },
};

pub trait Updater {
    fn update(&mut self, statement: &UpdateStatement) -> Result<QueryOutput>;
}

pub struct UpdateExecutor<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> UpdateExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }
}

impl Updater for UpdateExecutor<'_, '_> {
    /// SET expressions see the row as it was before the statement. The whole
    /// table is checked before the record file is replaced, so a failing row
    /// leaves every row untouched.
    fn update(&mut self, statement: &UpdateStatement) -> Result<QueryOutput> {
        let handle = self.ctx.open_table(&statement.table)?;
        let schema = handle.schema()?;
        let is_column = |name: &str| schema.has_column(name);

        let mut targets = Vec::with_capacity(statement.assignments.len());
        for assignment in &statement.assignments {
            let index = schema.require_column_index(&assignment.column)?;
            if targets.iter().any(|&(seen, _)| seen == index) {
                return Err(DatabaseError::DuplicateColumn {
                    name: assignment.column.clone(),
                });
            }
            let value = assignment.value.clone().bind_value(&is_column);
            validate_columns(&value, &schema, None)?;
            targets.push((index, value));
        }

        let predicate = statement
            .selection
            .clone()
            .map(|selection| Predicate::new(selection.bind_bare_words(&is_column)));
        if let Some(predicate) = &predicate {
            predicate.validate_against_schema(&schema)?;
        }

        let mut rows = handle.records.read_rows()?;
        let mut changed = Vec::new();
        for (row_index, row) in rows.iter_mut().enumerate() {
            let view = SchemaRow::new(&schema, row);
            if let Some(predicate) = &predicate {
                if !predicate.evaluate(&view)? {
                    continue;
                }
            }

            let mut fields = Vec::with_capacity(targets.len());
            for (index, expression) in &targets {
                let index = *index;
                let column = &schema.columns[index];
                let value = evaluate(expression, &view)?;
                fields.push((index, column.data_type.coerce(&column.name, &value)?));
            }

            let mut updated: Row = row.clone();
            for (index, field) in fields {
                updated.set_value(index, field)?;
            }
            *row = updated;
            changed.push(row_index);
        }

        if changed.is_empty() {
            return Ok(QueryOutput::ok("0 rows affected (no matching records)"));
        }

        let database = handle.database.clone();
        IntegrityChecker::new(self.ctx, &database, &schema).check_update(&rows, &changed)?;
        handle.records.rewrite(&schema, &rows)?;

        debug!("Updated {} rows in '{}'", changed.len(), handle.name);
        Ok(QueryOutput::ok(format!(
            "{} row(s) affected",
            changed.len()
        )))
    }
}
