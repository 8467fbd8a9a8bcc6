use std::fs;

use tempfile::tempdir;

use ruanko::{
    planner::statement::ColumnDefinition,
    storage::{record::RecordFile, schema::TableSchema},
    types::{FIELD_SEPARATOR, NULL_SENTINEL, error::DatabaseError, row::Row},
};

fn items_schema() -> TableSchema {
    let columns = [("id", "INTEGER"), ("name", "VARCHAR(20)")]
        .iter()
        .map(|(name, type_text)| ColumnDefinition {
            name: name.to_string(),
            type_text: type_text.to_string(),
            constraint_text: String::new(),
        })
        .collect::<Vec<_>>();
    TableSchema::from_definitions("items", &columns).expect("valid schema")
}

fn row(values: &[&str]) -> Row {
    Row::new(values.iter().map(|v| v.to_string()).collect())
}

#[test]
fn test_row_line_round_trip_keeps_empty_fields() {
    let original = row(&["1", "", NULL_SENTINEL]);
    let line = original.to_line();
    assert_eq!(line.matches(FIELD_SEPARATOR).count(), 2);
    assert_eq!(Row::from_line(&line), original);
    assert!(Row::nulls(3).values.iter().all(|v| v == NULL_SENTINEL));
}

#[test]
fn test_create_writes_header_only() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let records = RecordFile::new(temp_dir.path().join("items.trd"));
    let schema = items_schema();

    records.create(&schema)?;
    let content = fs::read_to_string(records.path())?;
    assert_eq!(content.lines().count(), 3);

    let reader = records.reader()?;
    assert_eq!(reader.header().len(), 3);
    assert_eq!(reader.header()[0], row(&["id", "name"]));
    assert!(records.read_rows()?.is_empty());
    Ok(())
}

#[test]
fn test_append_and_stream_rows() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let records = RecordFile::new(temp_dir.path().join("items.trd"));
    records.create(&items_schema())?;

    records.append(&row(&["1", "pen"]))?;
    records.append(&row(&["2", NULL_SENTINEL]))?;

    let reader = records.reader()?;
    assert_eq!(reader.column_names(), ["id", "name"]);
    let rows = reader.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows, vec![row(&["1", "pen"]), row(&["2", NULL_SENTINEL])]);
    Ok(())
}

#[test]
fn test_rewrite_replaces_rows() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let records = RecordFile::new(temp_dir.path().join("items.trd"));
    let schema = items_schema();
    records.create(&schema)?;
    records.append(&row(&["1", "pen"]))?;
    records.append(&row(&["2", "cup"]))?;

    records.rewrite(&schema, &[row(&["2", "cup"])])?;
    assert_eq!(records.read_rows()?, vec![row(&["2", "cup"])]);

    // Nothing but the table file is left in the directory.
    let entries = fs::read_dir(temp_dir.path())?.count();
    assert_eq!(entries, 1);
    Ok(())
}

#[test]
fn test_dropped_stage_leaves_file_untouched() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let records = RecordFile::new(temp_dir.path().join("items.trd"));
    let schema = items_schema();
    records.create(&schema)?;
    records.append(&row(&["1", "pen"]))?;

    let staged = records.stage(&schema, &[row(&["9", "staged"])])?;
    drop(staged);

    assert_eq!(records.read_rows()?, vec![row(&["1", "pen"])]);
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_row_width_mismatch_is_malformed() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let records = RecordFile::new(temp_dir.path().join("items.trd"));
    records.create(&items_schema())?;
    records.append(&row(&["1", "pen", "extra"]))?;

    let result = records.read_rows();
    assert!(matches!(result, Err(DatabaseError::MalformedSchema { .. })));
    Ok(())
}

#[test]
fn test_missing_header_is_malformed() -> Result<(), DatabaseError> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("items.trd");
    fs::write(&path, "id\n")?;

    let result = RecordFile::new(&path).read_rows();
    assert!(matches!(result, Err(DatabaseError::MalformedSchema { .. })));
    Ok(())
}
