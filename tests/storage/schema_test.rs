use std::fs;

use tempfile::tempdir;

use ruanko::{
    planner::statement::ColumnDefinition,
    storage::schema::{ColumnSchema, TableSchema, read_schema, write_schema},
    types::{FIELD_SEPARATOR, error::DatabaseError, value::DataType},
};

fn definition(name: &str, type_text: &str, constraint_text: &str) -> ColumnDefinition {
    ColumnDefinition {
        name: name.to_string(),
        type_text: type_text.to_string(),
        constraint_text: constraint_text.to_string(),
    }
}

fn people_schema() -> TableSchema {
    TableSchema::from_definitions(
        "people",
        &[
            definition("id", "integer", "PRIMARY KEY"),
            definition("name", "varchar(20)", "NOT NULL"),
            definition("age", "INT", "CHECK (age >= 0)"),
        ],
    )
    .expect("valid schema")
}

#[test]
fn test_columns_are_parsed() {
    let schema = people_schema();

    assert_eq!(schema.width(), 3);
    assert_eq!(schema.column_names(), vec!["id", "name", "age"]);

    let id = schema.get_column("ID").unwrap();
    assert_eq!(id.type_text, "INTEGER");
    assert_eq!(id.data_type, DataType::Integer);
    assert!(id.is_primary_key());
    assert!(id.is_not_null());

    let name = schema.get_column("name").unwrap();
    assert_eq!(name.data_type, DataType::Varchar(Some(20)));
    assert!(name.constraints.not_null);
    assert_eq!(name.position, 1);

    let age = schema.get_column("age").unwrap();
    assert!(age.constraints.check.is_some());
    assert_eq!(age.constraint_text, "CHECK (age >= 0)");
}

#[test]
fn test_write_then_read_schema() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("people.tdf");
    let schema = people_schema();

    write_schema(&path, &schema)?;
    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], ["id", "name", "age"].join(&FIELD_SEPARATOR.to_string()));
    assert_eq!(
        lines[1],
        ["INTEGER", "VARCHAR(20)", "INT"].join(&FIELD_SEPARATOR.to_string())
    );

    let loaded = read_schema(&path, "people")?;
    assert_eq!(loaded, schema);
    Ok(())
}

#[test]
fn test_short_definition_file_is_malformed() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("broken.tdf");
    fs::write(&path, "id\nINTEGER\n")?;

    let result = read_schema(&path, "broken");
    assert!(matches!(result, Err(DatabaseError::MalformedSchema { .. })));
    Ok(())
}

#[test]
fn test_misaligned_header_is_malformed() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("broken.tdf");
    let sep = FIELD_SEPARATOR;
    fs::write(&path, format!("id{sep}name\nINTEGER\n{sep}\n"))?;

    let result = read_schema(&path, "broken");
    assert!(matches!(result, Err(DatabaseError::MalformedSchema { .. })));
    Ok(())
}

#[test]
fn test_duplicate_and_invalid_columns_rejected() {
    let duplicate = TableSchema::from_definitions(
        "t",
        &[definition("a", "INTEGER", ""), definition("A", "INTEGER", "")],
    );
    assert!(matches!(duplicate, Err(DatabaseError::DuplicateColumn { .. })));

    let invalid = TableSchema::from_definitions("t", &[definition("1a", "INTEGER", "")]);
    assert!(matches!(invalid, Err(DatabaseError::InvalidName { .. })));

    let unknown_type = TableSchema::from_definitions("t", &[definition("a", "BLOB", "")]);
    assert!(matches!(unknown_type, Err(DatabaseError::UnsupportedDataType(_))));

    let empty = TableSchema::from_definitions("t", &[]);
    assert!(empty.is_err());
}

#[test]
fn test_add_modify_drop_column() -> Result<(), DatabaseError> {
    let mut schema = people_schema();

    schema.add_column(ColumnSchema::new("email", "varchar(50)", "UNIQUE", 0)?)?;
    assert_eq!(schema.width(), 4);
    assert_eq!(schema.columns[3].position, 3);
    assert!(schema.columns[3].is_unique());

    let index = schema.modify_column(ColumnSchema::new("AGE", "DOUBLE", "", 0)?)?;
    assert_eq!(index, 2);
    assert_eq!(schema.columns[2].name, "age");
    assert_eq!(schema.columns[2].data_type, DataType::Double);
    assert_eq!(schema.columns[2].constraint_text, "");

    let dropped = schema.drop_column("name")?;
    assert_eq!(dropped, 1);
    assert_eq!(schema.column_names(), vec!["id", "age", "email"]);
    assert!(schema.columns.iter().enumerate().all(|(i, c)| c.position == i));

    let missing = schema.drop_column("nope");
    assert!(matches!(missing, Err(DatabaseError::ColumnNotFound { .. })));
    Ok(())
}

#[test]
fn test_cannot_drop_only_column() -> Result<(), DatabaseError> {
    let mut schema = TableSchema::from_definitions("t", &[definition("a", "INTEGER", "")])?;
    assert!(schema.drop_column("a").is_err());
    assert_eq!(schema.width(), 1);
    Ok(())
}
