use tracing::debug;

use crate::{
    executor::{
        ExecutionContext, QueryOutput,
        predicate::{Predicate, SchemaRow},
    },
    planner::statement::DeleteStatement,
    types::error::Result,
};

pub trait Deleter {
    fn delete(&mut self, statement: &DeleteStatement) -> Result<QueryOutput>;
}

pub struct DeleteExecutor<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> DeleteExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }
}

impl Deleter for DeleteExecutor<'_, '_> {
    /// Rewrites the record file with the surviving rows. Without a WHERE
    /// clause only the header is kept.
    fn delete(&mut self, statement: &DeleteStatement) -> Result<QueryOutput> {
        let handle = self.ctx.open_table(&statement.table)?;
        let schema = handle.schema()?;
        let rows = handle.records.read_rows()?;

        let kept = match &statement.selection {
            None => Vec::new(),
            Some(selection) => {
                let predicate = Predicate::new(
                    selection
                        .clone()
                        .bind_bare_words(&|name: &str| schema.has_column(name)),
                );
                predicate.validate_against_schema(&schema)?;
                let mut kept = Vec::with_capacity(rows.len());
                for row in &rows {
                    if !predicate.evaluate(&SchemaRow::new(&schema, row))? {
                        kept.push(row.clone());
                    }
                }
                kept
            }
        };

        let deleted = rows.len() - kept.len();
        if deleted > 0 {
            handle.records.rewrite(&schema, &kept)?;
        }

        debug!("Deleted {} rows from '{}'", deleted, handle.name);
        Ok(QueryOutput::ok(format!("{} row(s) deleted", deleted)))
    }
}
