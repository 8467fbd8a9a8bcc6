use tracing::debug;

use crate::{
    executor::{
        ExecutionContext, QueryOutput,
        predicate::{JoinedRow, Predicate, SchemaRow},
        scan::{ScanIterator, TableScanner},
    },
    planner::{
        expression::ColumnRef,
        statement::{JoinClause, Projection, SelectStatement, TableRef},
    },
    storage::schema::TableSchema,
    types::{
        error::{DatabaseError, Result},
        is_null_sentinel,
        row::Row,
    },
};

pub trait Selector {
    fn select(&mut self, statement: &SelectStatement) -> Result<QueryOutput>;
}

pub struct SelectExecutor<'a, 'ctx> {
    ctx: &'a ExecutionContext<'ctx>,
}

impl<'a, 'ctx> SelectExecutor<'a, 'ctx> {
    pub fn new(ctx: &'a ExecutionContext<'ctx>) -> Self {
        Self { ctx }
    }

    /// Streams one table through the optional predicate and projects each match.
    fn select_single(&self, statement: &SelectStatement) -> Result<QueryOutput> {
        let handle = self.ctx.open_table(&statement.from.name)?;
        let table_schema = handle.schema()?;
        let predicate = statement.selection.clone().map(|selection| {
            Predicate::new(selection.bind_bare_words(&|name: &str| table_schema.has_column(name)))
        });
        let scanner = TableScanner::with_table_ref(&handle, statement.from.clone(), predicate)?;

        let schema = scanner.schema();
        let indices: Vec<usize> = match &statement.projection {
            Projection::All => (0..schema.width()).collect(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|column| single_column_index(schema, &statement.from, column))
                .collect::<Result<_>>()?,
        };
        let headers = indices
            .iter()
            .map(|&i| schema.columns[i].name.clone())
            .collect();

        let mut rows = Vec::new();
        for row in ScanIterator::new(scanner) {
            let row = row?;
            rows.push(project(&row, &indices));
        }

        debug!("Selected {} rows from '{}'", rows.len(), handle.name);
        Ok(QueryOutput::Rows { headers, rows })
    }

    /// Nested-loop equi-join of two fully loaded tables; NULL keys never match.
    fn select_join(&self, statement: &SelectStatement, join: &JoinClause) -> Result<QueryOutput> {
        let left_handle = self.ctx.open_table(&statement.from.name)?;
        let right_handle = self.ctx.open_table(&join.table.name)?;
        let left = JoinSide {
            table: &statement.from,
            schema: left_handle.schema()?,
        };
        let right = JoinSide {
            table: &join.table,
            schema: right_handle.schema()?,
        };

        let (first_side, first_index) = resolve_join_column(&left, &right, &join.left)?;
        let (second_side, second_index) = resolve_join_column(&left, &right, &join.right)?;
        let (left_key, right_key) = match (first_side, second_side) {
            (Side::Left, Side::Right) => (first_index, second_index),
            (Side::Right, Side::Left) => (second_index, first_index),
            _ => {
                return Err(DatabaseError::execution(
                    "the JOIN condition must compare one column from each table",
                ));
            }
        };

        let is_column = |name: &str| left.schema.has_column(name) || right.schema.has_column(name);
        let selection = statement
            .selection
            .clone()
            .map(|selection| selection.bind_bare_words(&is_column));
        if let Some(selection) = &selection {
            for column in selection.referenced_columns() {
                resolve_join_column(&left, &right, column)?;
            }
        }
        let predicate = selection.map(Predicate::new);

        let projection: Vec<(Side, usize)> = match &statement.projection {
            Projection::All => (0..left.schema.width())
                .map(|i| (Side::Left, i))
                .chain((0..right.schema.width()).map(|i| (Side::Right, i)))
                .collect(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|column| resolve_join_column(&left, &right, column))
                .collect::<Result<_>>()?,
        };
        let headers = projection
            .iter()
            .map(|&(side, index)| {
                let side = if side == Side::Left { &left } else { &right };
                format!(
                    "{}.{}",
                    side.table.effective_name(),
                    side.schema.columns[index].name
                )
            })
            .collect();

        let left_rows = left_handle.records.read_rows()?;
        let right_rows = right_handle.records.read_rows()?;

        let mut rows = Vec::new();
        for left_row in &left_rows {
            let Some(key) = left_row.get_value(left_key).filter(|k| !is_null_sentinel(k)) else {
                continue;
            };
            for right_row in &right_rows {
                if right_row.get_value(right_key) != Some(key) {
                    continue;
                }
                if let Some(predicate) = &predicate {
                    let joined = JoinedRow {
                        left: SchemaRow::with_table(&left.schema, left_row, left.table),
                        right: SchemaRow::with_table(&right.schema, right_row, right.table),
                    };
                    if !predicate.evaluate(&joined)? {
                        continue;
                    }
                }
                rows.push(
                    projection
                        .iter()
                        .map(|&(side, index)| {
                            let row = if side == Side::Left { left_row } else { right_row };
                            row.get_value(index).unwrap_or_default().to_string()
                        })
                        .collect(),
                );
            }
        }

        debug!(
            "Joined '{}' and '{}' into {} rows",
            left_handle.name,
            right_handle.name,
            rows.len()
        );
        Ok(QueryOutput::Rows { headers, rows })
    }
}

impl Selector for SelectExecutor<'_, '_> {
    fn select(&mut self, statement: &SelectStatement) -> Result<QueryOutput> {
        match &statement.join {
            Some(join) => self.select_join(statement, join),
            None => self.select_single(statement),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

struct JoinSide<'a> {
    table: &'a TableRef,
    schema: TableSchema,
}

fn single_column_index(schema: &TableSchema, table: &TableRef, column: &ColumnRef) -> Result<usize> {
    if let Some(qualifier) = &column.table {
        if !table.answers_to(qualifier) {
            return Err(DatabaseError::ColumnNotFound {
                name: column.qualified_name(),
                table: schema.table_name.clone(),
            });
        }
    }
    schema.require_column_index(&column.column)
}

/// Finds which joined table a column belongs to; bare names must be unambiguous.
fn resolve_join_column(left: &JoinSide, right: &JoinSide, column: &ColumnRef) -> Result<(Side, usize)> {
    let not_found = || DatabaseError::ColumnNotFound {
        name: column.qualified_name(),
        table: format!("{} JOIN {}", left.schema.table_name, right.schema.table_name),
    };

    match &column.table {
        Some(qualifier) => {
            // An alias hides the table's own name only when the two tables are the same.
            let side = if left.table.answers_to(qualifier) {
                (Side::Left, left)
            } else if right.table.answers_to(qualifier) {
                (Side::Right, right)
            } else {
                return Err(not_found());
            };
            let index = side.1.schema.get_column_index(&column.column).ok_or_else(not_found)?;
            Ok((side.0, index))
        }
        None => match (
            left.schema.get_column_index(&column.column),
            right.schema.get_column_index(&column.column),
        ) {
            (Some(_), Some(_)) => Err(DatabaseError::execution(format!(
                "column '{}' is ambiguous, qualify it with a table name or alias",
                column.column
            ))),
            (Some(index), None) => Ok((Side::Left, index)),
            (None, Some(index)) => Ok((Side::Right, index)),
            (None, None) => Err(not_found()),
        },
    }
}

fn project(row: &Row, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&i| row.get_value(i).unwrap_or_default().to_string())
        .collect()
}
