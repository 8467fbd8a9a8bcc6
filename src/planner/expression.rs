use crate::types::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Like,
    NotLike,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
                | BinaryOperator::Like
                | BinaryOperator::NotLike
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn with_table(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(String),
    String(String),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            // The tokenizer only hands out well-formed numbers.
            Literal::Number(n) => Value::from_number(n).unwrap_or_else(|| Value::Text(n.clone())),
            Literal::String(s) => Value::Text(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOpExpression {
    pub operator: UnaryOperator,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Column(ColumnRef),
    BinaryOp(BinaryOpExpression),
    UnaryOp(UnaryOpExpression),
    IsNull {
        expression: Box<Expression>,
        negated: bool,
    },
}

impl Expression {
    // Helper constructors
    pub fn column(name: &str) -> Self {
        Expression::Column(ColumnRef::new(name))
    }

    pub fn literal(literal: Literal) -> Self {
        Expression::Literal(literal)
    }

    pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp(BinaryOpExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn unary(operator: UnaryOperator, expression: Expression) -> Self {
        Expression::UnaryOp(UnaryOpExpression {
            operator,
            expression: Box::new(expression),
        })
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary(left, BinaryOperator::Equal, right)
    }

    /// A lone unqualified word that names no column is a text value, as in
    /// `SET name = cup`. Anything else goes through `bind_bare_words`.
    pub fn bind_value<F: Fn(&str) -> bool>(self, is_column: &F) -> Expression {
        match self {
            Expression::Column(column) if column.table.is_none() && !is_column(&column.column) => {
                Expression::literal(Literal::String(column.column))
            }
            other => other.bind_bare_words(is_column),
        }
    }

    /// Rewrites the value side of every comparison with `bind_value`, so
    /// `name = pen` compares against the text `pen` unless a column is called `pen`.
    pub fn bind_bare_words<F: Fn(&str) -> bool>(self, is_column: &F) -> Expression {
        match self {
            Expression::BinaryOp(op) => {
                let left = (*op.left).bind_bare_words(is_column);
                let right = if op.operator.is_comparison() {
                    (*op.right).bind_value(is_column)
                } else {
                    (*op.right).bind_bare_words(is_column)
                };
                Expression::binary(left, op.operator, right)
            }
            Expression::UnaryOp(op) => Expression::unary(op.operator, (*op.expression).bind_bare_words(is_column)),
            Expression::IsNull {
                expression,
                negated,
            } => Expression::IsNull {
                expression: Box::new((*expression).bind_bare_words(is_column)),
                negated,
            },
            other => other,
        }
    }

    /// All column references in the tree, in first-seen order without duplicates.
    pub fn referenced_columns(&self) -> Vec<&ColumnRef> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut Vec<&'a ColumnRef>) {
        match self {
            Expression::Column(column) => {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
            Expression::BinaryOp(op) => {
                op.left.collect_columns(columns);
                op.right.collect_columns(columns);
            }
            Expression::UnaryOp(op) => op.expression.collect_columns(columns),
            Expression::IsNull { expression, .. } => expression.collect_columns(columns),
            Expression::Literal(_) => {}
        }
    }
}
