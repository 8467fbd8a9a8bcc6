use std::cmp::Ordering;

use regex::RegexBuilder;

use crate::{
    planner::{
        expression::{BinaryOperator, ColumnRef, Expression, UnaryOperator},
        statement::TableRef,
    },
    storage::schema::TableSchema,
    types::{
        error::{DatabaseError, Result},
        row::Row,
        value::Value,
    },
};

/// Supplies the value of a column reference while an expression is evaluated.
pub trait ColumnResolver {
    fn resolve(&self, column: &ColumnRef) -> Result<Value>;
}

/// Expressions evaluated outside any row, such as INSERT values and DEFAULTs.
pub struct NoColumns;

impl ColumnResolver for NoColumns {
    fn resolve(&self, column: &ColumnRef) -> Result<Value> {
        Err(DatabaseError::execution(format!(
            "column reference '{}' is not allowed here",
            column.qualified_name()
        )))
    }
}

/// A stored row viewed through its table's schema.
pub struct SchemaRow<'a> {
    pub schema: &'a TableSchema,
    pub row: &'a Row,
    pub table: Option<&'a TableRef>,
}

impl<'a> SchemaRow<'a> {
    pub fn new(schema: &'a TableSchema, row: &'a Row) -> Self {
        Self {
            schema,
            row,
            table: None,
        }
    }

    pub fn with_table(schema: &'a TableSchema, row: &'a Row, table: &'a TableRef) -> Self {
        Self {
            schema,
            row,
            table: Some(table),
        }
    }

    fn answers_to(&self, qualifier: &str) -> bool {
        match self.table {
            Some(table) => table.answers_to(qualifier),
            None => self.schema.table_name.eq_ignore_ascii_case(qualifier),
        }
    }

    fn lookup(&self, column: &str) -> Option<Value> {
        self.schema
            .get_column_index(column)
            .map(|index| self.row.value_at(index))
    }
}

impl ColumnResolver for SchemaRow<'_> {
    fn resolve(&self, column: &ColumnRef) -> Result<Value> {
        let qualifier_ok = column
            .table
            .as_deref()
            .is_none_or(|qualifier| self.answers_to(qualifier));
        qualifier_ok
            .then(|| self.lookup(&column.column))
            .flatten()
            .ok_or_else(|| DatabaseError::ColumnNotFound {
                name: column.qualified_name(),
                table: self.schema.table_name.clone(),
            })
    }
}

/// A pair of rows produced by a join; bare names must be unambiguous.
pub struct JoinedRow<'a> {
    pub left: SchemaRow<'a>,
    pub right: SchemaRow<'a>,
}

impl ColumnResolver for JoinedRow<'_> {
    fn resolve(&self, column: &ColumnRef) -> Result<Value> {
        match column.table.as_deref() {
            Some(qualifier) if self.left.answers_to(qualifier) => self.left.resolve(column),
            Some(qualifier) if self.right.answers_to(qualifier) => self.right.resolve(column),
            Some(_) => Err(DatabaseError::ColumnNotFound {
                name: column.qualified_name(),
                table: format!(
                    "{} JOIN {}",
                    self.left.schema.table_name, self.right.schema.table_name
                ),
            }),
            None => match (self.left.lookup(&column.column), self.right.lookup(&column.column)) {
                (Some(_), Some(_)) => Err(DatabaseError::execution(format!(
                    "column '{}' is ambiguous, qualify it with a table name or alias",
                    column.column
                ))),
                (Some(value), None) | (None, Some(value)) => Ok(value),
                (None, None) => Err(DatabaseError::ColumnNotFound {
                    name: column.column.clone(),
                    table: format!(
                        "{} JOIN {}",
                        self.left.schema.table_name, self.right.schema.table_name
                    ),
                }),
            },
        }
    }
}

/// A WHERE or CHECK condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    expression: Expression,
}

impl Predicate {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn evaluate<R: ColumnResolver>(&self, row: &R) -> Result<bool> {
        Ok(evaluate(&self.expression, row)?.is_truthy())
    }

    /// Validate that all referenced columns exist in the schema
    pub fn validate_against_schema(&self, schema: &TableSchema) -> Result<()> {
        validate_columns(&self.expression, schema, None)
    }
}

/// Checks every column reference against one table, qualified by its name or `table_ref`'s alias.
pub fn validate_columns(
    expression: &Expression,
    schema: &TableSchema,
    table_ref: Option<&TableRef>,
) -> Result<()> {
    for column in expression.referenced_columns() {
        let qualifier_ok = column.table.as_deref().is_none_or(|q| match table_ref {
            Some(table_ref) => table_ref.answers_to(q),
            None => q.eq_ignore_ascii_case(&schema.table_name),
        });
        if !qualifier_ok || schema.get_column(&column.column).is_none() {
            return Err(DatabaseError::ColumnNotFound {
                name: column.qualified_name(),
                table: schema.table_name.clone(),
            });
        }
    }
    Ok(())
}

/// Evaluates an expression to a value. Comparisons and logic yield booleans,
/// arithmetic yields numbers, and NULL propagates through arithmetic.
pub fn evaluate<R: ColumnResolver + ?Sized>(expression: &Expression, row: &R) -> Result<Value> {
    match expression {
        Expression::Literal(literal) => Ok(literal.to_value()),
        Expression::Column(column) => row.resolve(column),
        Expression::IsNull {
            expression,
            negated,
        } => {
            let value = evaluate(expression, row)?;
            Ok(Value::Boolean(value.is_null() != *negated))
        }
        Expression::UnaryOp(op) => {
            let value = evaluate(&op.expression, row)?;
            match op.operator {
                UnaryOperator::Not => Ok(Value::Boolean(!value.is_truthy())),
                UnaryOperator::Plus => numeric_operand(&value),
                UnaryOperator::Minus => match numeric_operand(&value)? {
                    Value::Integer(i) => i
                        .checked_neg()
                        .map(Value::Integer)
                        .ok_or_else(|| DatabaseError::execution("integer overflow")),
                    Value::Real(r) => Ok(Value::Real(-r)),
                    other => Ok(other),
                },
            }
        }
        Expression::BinaryOp(op) => match op.operator {
            BinaryOperator::And => {
                if !evaluate(&op.left, row)?.is_truthy() {
                    return Ok(Value::Boolean(false)); // Short-circuit evaluation
                }
                Ok(Value::Boolean(evaluate(&op.right, row)?.is_truthy()))
            }
            BinaryOperator::Or => {
                if evaluate(&op.left, row)?.is_truthy() {
                    return Ok(Value::Boolean(true)); // Short-circuit evaluation
                }
                Ok(Value::Boolean(evaluate(&op.right, row)?.is_truthy()))
            }
            ref operator if operator.is_arithmetic() => {
                let left = evaluate(&op.left, row)?;
                let right = evaluate(&op.right, row)?;
                arithmetic(&left, operator, &right)
            }
            ref operator => {
                let left = evaluate(&op.left, row)?;
                let right = evaluate(&op.right, row)?;
                compare_values(&left, operator, &right).map(Value::Boolean)
            }
        },
    }
}

fn numeric_operand(value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    value.to_numeric().ok_or_else(|| {
        DatabaseError::execution(format!("{} is not a number", value.describe()))
    })
}

fn arithmetic(left: &Value, operator: &BinaryOperator, right: &Value) -> Result<Value> {
    let left = numeric_operand(left)?;
    let right = numeric_operand(right)?;
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if let (Value::Integer(a), Value::Integer(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        let result = match operator {
            BinaryOperator::Add => a.checked_add(b),
            BinaryOperator::Subtract => a.checked_sub(b),
            BinaryOperator::Multiply => a.checked_mul(b),
            BinaryOperator::Divide => {
                if b == 0 {
                    return Err(DatabaseError::execution("division by zero"));
                }
                if a % b != 0 {
                    return Ok(Value::Real(a as f64 / b as f64));
                }
                a.checked_div(b)
            }
            _ => None,
        };
        return result
            .map(Value::Integer)
            .ok_or_else(|| DatabaseError::execution("integer overflow"));
    }

    let (a, b) = match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(DatabaseError::execution("arithmetic on non-numeric values")),
    };
    let result = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => {
            if b == 0.0 {
                return Err(DatabaseError::execution("division by zero"));
            }
            a / b
        }
        _ => return Err(DatabaseError::execution("not an arithmetic operator")),
    };
    Ok(Value::Real(result))
}

/// Compares two operands in this order: NULL rules, numeric, date, then
/// case-insensitive text. LIKE always compares as text.
pub fn compare_values(left: &Value, operator: &BinaryOperator, right: &Value) -> Result<bool> {
    if left.is_null() || right.is_null() {
        return Ok(match operator {
            BinaryOperator::Equal => left.is_null() && right.is_null(),
            BinaryOperator::NotEqual => left.is_null() != right.is_null(),
            _ => false,
        });
    }

    match operator {
        BinaryOperator::Like => return like_match(&left.to_field(), &right.to_field()),
        BinaryOperator::NotLike => {
            return like_match(&left.to_field(), &right.to_field()).map(|matched| !matched);
        }
        _ => {}
    }

    let ordering = if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        a.partial_cmp(&b)
    } else if let (Some(a), Some(b)) = (left.as_date(), right.as_date()) {
        Some(a.cmp(&b))
    } else {
        Some(
            left.to_field()
                .to_lowercase()
                .cmp(&right.to_field().to_lowercase()),
        )
    };

    let Some(ordering) = ordering else {
        return Ok(false); // Incomparable values
    };
    Ok(match operator {
        BinaryOperator::Equal => ordering == Ordering::Equal,
        BinaryOperator::NotEqual => ordering != Ordering::Equal,
        BinaryOperator::LessThan => ordering == Ordering::Less,
        BinaryOperator::LessThanOrEqual => ordering != Ordering::Greater,
        BinaryOperator::GreaterThan => ordering == Ordering::Greater,
        BinaryOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        _ => {
            return Err(DatabaseError::execution(format!(
                "{:?} is not a comparison operator",
                operator
            )));
        }
    })
}

/// LIKE with `%` for any run of characters and `_` for exactly one, case-insensitive.
pub fn like_match(text: &str, pattern: &str) -> Result<bool> {
    let mut regex_pattern = String::with_capacity(pattern.len() + 8);
    regex_pattern.push('^');
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                regex_pattern.push_str(&regex::escape(&literal));
                literal.clear();
                regex_pattern.push_str(if c == '%' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    regex_pattern.push_str(&regex::escape(&literal));
    regex_pattern.push('$');

    let regex = RegexBuilder::new(&regex_pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| DatabaseError::execution(format!("invalid LIKE pattern: {}", e)))?;
    Ok(regex.is_match(text))
}
