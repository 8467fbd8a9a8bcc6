use ruanko::{
    executor::predicate::{
        JoinedRow, NoColumns, Predicate, SchemaRow, compare_values, evaluate, like_match,
    },
    planner::{
        expression::{BinaryOperator, Expression},
        parser::SqlParser,
        statement::{ColumnDefinition, TableRef},
    },
    storage::schema::TableSchema,
    types::{error::DatabaseError, row::Row, value::Value},
};

fn schema(table: &str, columns: &[(&str, &str)]) -> TableSchema {
    let definitions = columns
        .iter()
        .map(|(name, type_text)| ColumnDefinition {
            name: name.to_string(),
            type_text: type_text.to_string(),
            constraint_text: String::new(),
        })
        .collect::<Vec<_>>();
    TableSchema::from_definitions(table, &definitions).expect("valid schema")
}

fn row(values: &[&str]) -> Row {
    Row::new(values.iter().map(|v| v.to_string()).collect())
}

fn expr(text: &str) -> Expression {
    SqlParser::new().parse_expression(text).expect("valid expression")
}

fn matches(text: &str, schema: &TableSchema, row: &Row) -> bool {
    Predicate::new(expr(text))
        .evaluate(&SchemaRow::new(schema, row))
        .expect("evaluates")
}

fn people() -> (TableSchema, Row) {
    let schema = schema(
        "people",
        &[("id", "INTEGER"), ("name", "VARCHAR(20)"), ("born", "DATE"), ("score", "DOUBLE")],
    );
    (schema, row(&["10", "Alice", "1990-05-01", "null"]))
}

#[test]
fn test_numeric_comparisons() {
    let (schema, row) = people();
    assert!(matches("id = 10", &schema, &row));
    assert!(matches("id > 9", &schema, &row));
    assert!(matches("id >= 10.0", &schema, &row));
    assert!(!matches("id < 10", &schema, &row));
    assert!(matches("id != 11", &schema, &row));
    // Numbers compare numerically, not as text.
    assert!(matches("id > '9'", &schema, &row));
}

#[test]
fn test_string_and_date_comparisons() {
    let (schema, row) = people();
    assert!(matches("name = 'alice'", &schema, &row));
    assert!(matches("name > 'Aaron'", &schema, &row));
    assert!(matches("born < '2000-01-01'", &schema, &row));
    assert!(matches("born = '1990-05-01'", &schema, &row));
}

#[test]
fn test_null_semantics() {
    let (schema, row) = people();
    assert!(matches("score IS NULL", &schema, &row));
    assert!(!matches("score IS NOT NULL", &schema, &row));
    assert!(matches("score = NULL", &schema, &row));
    assert!(!matches("score > 0", &schema, &row));
    assert!(!matches("score < 0", &schema, &row));
    assert!(matches("name != NULL", &schema, &row));
}

#[test]
fn test_logic_and_precedence() {
    let (schema, row) = people();
    assert!(matches("id = 1 OR id = 10 AND name = 'Alice'", &schema, &row));
    assert!(!matches("(id = 1 OR id = 10) AND name = 'Bob'", &schema, &row));
    assert!(matches("NOT id = 1", &schema, &row));
    assert!(matches("people.id = 10", &schema, &row));
}

#[test]
fn test_like_patterns() -> Result<(), DatabaseError> {
    assert!(like_match("Alice", "al%")?);
    assert!(like_match("Alice", "_lice")?);
    assert!(!like_match("Alice", "_ice")?);
    assert!(like_match("a.b", "a.b")?);
    assert!(!like_match("axb", "a.b")?);
    assert!(like_match("50% off", "50%")?);

    let (schema, row) = people();
    assert!(matches("name LIKE 'A%'", &schema, &row));
    assert!(matches("name NOT LIKE 'B%'", &schema, &row));
    Ok(())
}

#[test]
fn test_arithmetic() -> Result<(), DatabaseError> {
    let (schema, row) = people();
    let view = SchemaRow::new(&schema, &row);

    assert_eq!(evaluate(&expr("id + 5"), &view)?, Value::Integer(15));
    assert_eq!(evaluate(&expr("id * 2 - 1"), &view)?, Value::Integer(19));
    assert_eq!(evaluate(&expr("id / 4"), &view)?, Value::Real(2.5));
    assert_eq!(evaluate(&expr("id / 5"), &view)?, Value::Integer(2));
    assert_eq!(evaluate(&expr("-id"), &view)?, Value::Integer(-10));
    assert_eq!(evaluate(&expr("score + 1"), &view)?, Value::Null);
    assert!(evaluate(&expr("id / 0"), &view).is_err());
    assert!(evaluate(&expr("name + 1"), &view).is_err());
    Ok(())
}

#[test]
fn test_unknown_columns() {
    let (schema, row) = people();
    let view = SchemaRow::new(&schema, &row);

    let missing = evaluate(&expr("salary > 1"), &view);
    assert!(matches!(missing, Err(DatabaseError::ColumnNotFound { .. })));
    let wrong_table = evaluate(&expr("other.id = 1"), &view);
    assert!(matches!(wrong_table, Err(DatabaseError::ColumnNotFound { .. })));

    assert!(Predicate::new(expr("salary > 1")).validate_against_schema(&schema).is_err());
    assert!(Predicate::new(expr("id > 1")).validate_against_schema(&schema).is_ok());

    assert!(evaluate(&expr("id"), &NoColumns).is_err());
    assert_eq!(evaluate(&expr("2 + 3"), &NoColumns).unwrap(), Value::Integer(5));
}

#[test]
fn test_joined_rows_resolve_by_alias() -> Result<(), DatabaseError> {
    let emp = schema("emp", &[("id", "INTEGER"), ("dept_id", "INTEGER"), ("name", "VARCHAR")]);
    let dept = schema("dept", &[("id", "INTEGER"), ("title", "VARCHAR")]);
    let emp_row = row(&["1", "7", "Ann"]);
    let dept_row = row(&["7", "Sales"]);
    let e = TableRef::with_alias("emp", "e");
    let d = TableRef::new("dept");

    let joined = JoinedRow {
        left: SchemaRow::with_table(&emp, &emp_row, &e),
        right: SchemaRow::with_table(&dept, &dept_row, &d),
    };

    assert_eq!(evaluate(&expr("e.name"), &joined)?, Value::Text("Ann".into()));
    assert_eq!(evaluate(&expr("emp.dept_id"), &joined)?, Value::Text("7".into()));
    assert_eq!(evaluate(&expr("dept.title"), &joined)?, Value::Text("Sales".into()));
    assert_eq!(evaluate(&expr("title"), &joined)?, Value::Text("Sales".into()));
    assert!(Predicate::new(expr("e.dept_id = dept.id")).evaluate(&joined)?);

    // `id` exists on both sides.
    assert!(evaluate(&expr("id"), &joined).is_err());
    Ok(())
}

#[test]
fn test_compare_values_directly() -> Result<(), DatabaseError> {
    assert!(compare_values(
        &Value::Text("2.50".into()),
        &BinaryOperator::Equal,
        &Value::Real(2.5)
    )?);
    assert!(compare_values(&Value::Null, &BinaryOperator::Equal, &Value::Null)?);
    assert!(!compare_values(
        &Value::Null,
        &BinaryOperator::LessThan,
        &Value::Integer(1)
    )?);
    assert!(compare_values(
        &Value::Text("2024-01-10".into()),
        &BinaryOperator::GreaterThan,
        &Value::Text("2024-01-09".into())
    )?);
    Ok(())
}
