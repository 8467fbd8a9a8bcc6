use std::fs::OpenOptions;
use std::io::Write;

use ruanko::{
    executor::{
        TableHandle,
        predicate::Predicate,
        scan::{ScanIterator, Scanner, TableScanner},
    },
    planner::{parser::SqlParser, statement::TableRef},
    types::error::DatabaseError,
    utils::mock::TempEngine,
};

fn setup_test_db(row_count: usize) -> Result<(TempEngine, TableHandle), DatabaseError> {
    let mut db = TempEngine::with_database("scan", "shop")?;
    db.run("CREATE TABLE items (id INTEGER, name VARCHAR(20));")?;
    for i in 1..=row_count {
        db.run(&format!("INSERT INTO items VALUES ({}, 'item_{}');", i, i))?;
    }
    let handle = TableHandle::new(db.engine.catalog().paths(), "shop", "items");
    Ok((db, handle))
}

fn predicate(text: &str) -> Predicate {
    Predicate::new(SqlParser::new().parse_expression(text).expect("valid expression"))
}

#[test]
fn test_scan_returns_rows_in_file_order() -> Result<(), DatabaseError> {
    let (_db, handle) = setup_test_db(5)?;
    let mut scanner = TableScanner::new(&handle, None)?;

    let mut ids = Vec::new();
    while let Some(row) = scanner.scan()? {
        ids.push(row.get_value(0).unwrap_or_default().to_string());
    }
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert!(scanner.scan()?.is_none());
    Ok(())
}

#[test]
fn test_scan_with_predicate() -> Result<(), DatabaseError> {
    let (_db, handle) = setup_test_db(10)?;
    let scanner = TableScanner::new(&handle, Some(predicate("id > 3 AND id <= 6")))?;

    let rows = ScanIterator::new(scanner).collect::<Result<Vec<_>, _>>()?;
    let names: Vec<&str> = rows.iter().filter_map(|r| r.get_value(1)).collect();
    assert_eq!(names, vec!["item_4", "item_5", "item_6"]);
    Ok(())
}

#[test]
fn test_scan_empty_table() -> Result<(), DatabaseError> {
    let (_db, handle) = setup_test_db(0)?;
    let scanner = TableScanner::new(&handle, None)?;
    assert_eq!(ScanIterator::new(scanner).count(), 0);
    Ok(())
}

#[test]
fn test_scan_rejects_unknown_columns() -> Result<(), DatabaseError> {
    let (_db, handle) = setup_test_db(1)?;

    let result = TableScanner::new(&handle, Some(predicate("price > 1")));
    assert!(matches!(result, Err(DatabaseError::ColumnNotFound { .. })));

    let aliased = TableScanner::with_table_ref(
        &handle,
        TableRef::with_alias("items", "i"),
        Some(predicate("i.id = 1")),
    )?;
    assert_eq!(ScanIterator::new(aliased).count(), 1);
    Ok(())
}

#[test]
fn test_scan_detects_header_mismatch() -> Result<(), DatabaseError> {
    let (_db, handle) = setup_test_db(1)?;

    // Replace the record file with one whose header names a single column.
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(handle.records.path())?;
    writeln!(file, "id")?;
    writeln!(file, "INTEGER")?;
    writeln!(file)?;

    let result = TableScanner::new(&handle, None);
    assert!(matches!(result, Err(DatabaseError::MalformedSchema { .. })));
    Ok(())
}
