use ruanko::{
    executor::QueryOutput,
    types::error::DatabaseError,
    utils::mock::TempEngine,
};

fn setup_test_db() -> TempEngine {
    let mut db = TempEngine::with_database("update_delete", "shop").expect("Failed to create test database");
    db.run_all(&[
        "CREATE TABLE items (id INTEGER PRIMARY KEY, code VARCHAR(8) UNIQUE, \
         name VARCHAR(20) NOT NULL, n INTEGER CHECK (n >= 0));",
        "INSERT INTO items VALUES (1, 'A1', 'pen', 10);",
        "INSERT INTO items VALUES (2, 'B2', 'cup', 0);",
        "INSERT INTO items VALUES (3, 'C3', 'mug', 7);",
    ])
    .expect("Failed to load fixtures");
    db
}

fn all_items(db: &mut TempEngine) -> Vec<Vec<String>> {
    db.query_rows("SELECT * FROM items;").expect("select")
}

fn message(text: &str) -> QueryOutput {
    QueryOutput::Message(text.to_string())
}

#[test]
fn test_update_reads_previous_values() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    for expected in ["8", "9"] {
        let output = db.run("UPDATE items SET n = n + 1 WHERE id = 3;")?;
        assert_eq!(output, message("Query OK: 1 row(s) affected"));
        assert_eq!(db.query_rows("SELECT n FROM items WHERE id = 3;")?, vec![vec![expected]]);
    }
    // Untouched rows keep their values.
    assert_eq!(db.query_rows("SELECT n FROM items WHERE id = 1;")?, vec![vec!["10"]]);
    Ok(())
}

#[test]
fn test_update_several_columns_and_rows() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    let output = db.run("UPDATE items SET n = n * 2, name = 'thing' WHERE n > 5;")?;
    assert_eq!(output, message("Query OK: 2 row(s) affected"));
    assert_eq!(
        all_items(&mut db),
        vec![
            vec!["1", "A1", "thing", "20"],
            vec!["2", "B2", "cup", "0"],
            vec!["3", "C3", "thing", "14"],
        ]
    );

    let output = db.run("UPDATE items SET n = 1;")?;
    assert_eq!(output, message("Query OK: 3 row(s) affected"));
    Ok(())
}

#[test]
fn test_unquoted_words_are_text_values() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    db.run("UPDATE items SET name = bowl WHERE name = cup;")?;
    assert_eq!(db.query_rows("SELECT name FROM items WHERE id = 2;")?, vec![vec!["bowl"]]);

    // A bare column name on the right is still that column.
    db.run("UPDATE items SET name = code WHERE id = 1;")?;
    assert_eq!(db.query_rows("SELECT name FROM items WHERE id = 1;")?, vec![vec!["A1"]]);

    let output = db.run("DELETE FROM items WHERE name = mug;")?;
    assert_eq!(output, message("Query OK: 1 row(s) deleted"));
    assert_eq!(all_items(&mut db).len(), 2);
    Ok(())
}

#[test]
fn test_update_without_matches() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();
    let before = all_items(&mut db);

    let output = db.run("UPDATE items SET n = 0 WHERE id = 42;")?;
    assert_eq!(output, message("Query OK: 0 rows affected (no matching records)"));
    assert_eq!(all_items(&mut db), before);
    Ok(())
}

#[test]
fn test_failed_update_changes_nothing() {
    let mut db = setup_test_db();
    let before = all_items(&mut db);

    let cases = [
        "UPDATE items SET id = 1 WHERE id = 2;",
        "UPDATE items SET id = NULL WHERE id = 2;",
        "UPDATE items SET code = 'A1' WHERE id = 3;",
        "UPDATE items SET name = NULL;",
        "UPDATE items SET n = n - 5;",
        "UPDATE items SET n = 'many' WHERE id = 1;",
        "UPDATE items SET missing = 1;",
        "UPDATE items SET n = 1, n = 2;",
        "UPDATE items SET n = 1 WHERE missing = 1;",
    ];
    for sql in cases {
        assert!(db.run(sql).is_err(), "{sql} should fail");
        assert_eq!(all_items(&mut db), before, "{sql} modified the table");
    }

    assert!(matches!(
        db.run("UPDATE items SET id = 1 WHERE id = 2;"),
        Err(DatabaseError::PrimaryKeyViolation { .. })
    ));
    assert!(matches!(
        db.run("UPDATE items SET code = 'A1' WHERE id = 3;"),
        Err(DatabaseError::UniqueViolation { .. })
    ));
    assert!(matches!(
        db.run("UPDATE items SET name = NULL;"),
        Err(DatabaseError::NotNullViolation { .. })
    ));
    assert!(matches!(
        db.run("UPDATE items SET n = n - 5;"),
        Err(DatabaseError::CheckViolation { .. })
    ));
}

#[test]
fn test_swapping_unique_values_in_one_statement() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    // Every key is shifted at once; the final table has no duplicates.
    db.run("UPDATE items SET id = id + 1;")?;
    let ids: Vec<String> = db
        .query_rows("SELECT id FROM items;")?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(ids, vec!["2", "3", "4"]);
    Ok(())
}

#[test]
fn test_update_respects_foreign_keys() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();
    db.run("CREATE TABLE orders (id INTEGER PRIMARY KEY, item_id INTEGER REFERENCES items(id));")?;
    db.run("INSERT INTO orders VALUES (1, 1);")?;

    db.run("UPDATE orders SET item_id = 3 WHERE id = 1;")?;
    assert!(matches!(
        db.run("UPDATE orders SET item_id = 99 WHERE id = 1;"),
        Err(DatabaseError::ForeignKeyViolation { .. })
    ));
    assert_eq!(db.query_rows("SELECT item_id FROM orders;")?, vec![vec!["3"]]);
    Ok(())
}

#[test]
fn test_delete_with_where() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    let output = db.run("DELETE FROM items WHERE n < 8;")?;
    assert_eq!(output, message("Query OK: 2 row(s) deleted"));
    assert_eq!(all_items(&mut db), vec![vec!["1", "A1", "pen", "10"]]);

    let output = db.run("DELETE FROM items WHERE id = 99;")?;
    assert_eq!(output, message("Query OK: 0 row(s) deleted"));
    assert_eq!(all_items(&mut db).len(), 1);
    Ok(())
}

#[test]
fn test_delete_everything_keeps_the_table() -> Result<(), DatabaseError> {
    let mut db = setup_test_db();

    let output = db.run("DELETE FROM items;")?;
    assert_eq!(output, message("Query OK: 3 row(s) deleted"));
    assert!(all_items(&mut db).is_empty());
    assert_eq!(db.execute("SELECT * FROM items;"), "Query OK: 0 rows returned");

    // The schema survives and accepts new rows.
    db.run("INSERT INTO items VALUES (1, 'A1', 'pen', 1);")?;
    assert_eq!(all_items(&mut db).len(), 1);
    Ok(())
}

#[test]
fn test_delete_errors() {
    let mut db = setup_test_db();
    assert!(matches!(
        db.run("DELETE FROM items WHERE missing = 1;"),
        Err(DatabaseError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        db.run("DELETE FROM nothing;"),
        Err(DatabaseError::TableNotFound { .. })
    ));
    assert_eq!(all_items(&mut db).len(), 3);
}
