use ruanko::planner::{
    error::PlannerError,
    expression::{BinaryOperator, ColumnRef, Expression, Literal, UnaryOperator},
    parser::SqlParser,
    statement::{
        AlterAction, BackupStatement, Projection, RestoreStatement, Statement, TableRef,
    },
};

fn parse(sql: &str) -> Statement {
    SqlParser::new()
        .parse_sql(sql)
        .unwrap_or_else(|e| panic!("failed to parse {sql:?}: {e}"))
}

fn number(n: &str) -> Expression {
    Expression::literal(Literal::Number(n.to_string()))
}

fn string(s: &str) -> Expression {
    Expression::literal(Literal::String(s.to_string()))
}

#[test]
fn test_parse_database_statements() {
    assert_eq!(
        parse("CREATE DATABASE shop;"),
        Statement::CreateDatabase {
            name: "shop".to_string()
        }
    );
    assert_eq!(
        parse("drop database shop"),
        Statement::DropDatabase {
            name: "shop".to_string()
        }
    );
    assert_eq!(
        parse("use shop;"),
        Statement::Use {
            name: "shop".to_string()
        }
    );
    assert_eq!(parse("SHOW DATABASES;"), Statement::ShowDatabases);
    assert_eq!(parse("show tables"), Statement::ShowTables);
    assert_eq!(
        parse("describe items;"),
        Statement::Describe {
            table: "items".to_string()
        }
    );
    assert_eq!(parse("help;"), Statement::Help);
}

#[test]
fn test_parse_create_table_keeps_constraint_text() {
    let Statement::CreateTable(create) = parse(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name VARCHAR(20) NOT NULL, \
         qty int CHECK (qty >= 0) DEFAULT 1, dept INTEGER REFERENCES depts(id));",
    ) else {
        panic!("expected CREATE TABLE");
    };

    assert_eq!(create.table, "items");
    let columns: Vec<(&str, &str, &str)> = create
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.type_text.as_str(), c.constraint_text.as_str()))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("id", "INTEGER", "PRIMARY KEY"),
            ("name", "VARCHAR(20)", "NOT NULL"),
            ("qty", "INT", "CHECK (qty >= 0) DEFAULT 1"),
            ("dept", "INTEGER", "REFERENCES depts(id)"),
        ]
    );
}

#[test]
fn test_parse_column_constraints() {
    let parser = SqlParser::new();

    let constraints = parser
        .parse_column_constraints("NOT NULL UNIQUE DEFAULT 'n/a' CHECK (len > 0)")
        .unwrap();
    assert!(constraints.not_null);
    assert!(constraints.unique);
    assert!(!constraints.primary_key);
    assert_eq!(constraints.default, Some(string("n/a")));
    assert_eq!(constraints.check_text.as_deref(), Some("len > 0"));

    let foreign = parser
        .parse_column_constraints("FOREIGN KEY REFERENCES depts")
        .unwrap();
    let reference = foreign.references.unwrap();
    assert_eq!(reference.table, "depts");
    assert_eq!(reference.column, None);

    assert!(matches!(
        parser.parse_column_constraints("AUTO_INCREMENT"),
        Err(PlannerError::UnsupportedConstraint(_))
    ));
    assert!(parser.parse_column_constraints("DEFAULT other_column").is_err());
}

#[test]
fn test_parse_alter_table() {
    let Statement::AlterTable(alter) = parse("ALTER TABLE items ADD COLUMN price DOUBLE NOT NULL DEFAULT 0;")
    else {
        panic!("expected ALTER TABLE");
    };
    assert_eq!(alter.table, "items");
    let AlterAction::AddColumn(column) = alter.action else {
        panic!("expected ADD COLUMN");
    };
    assert_eq!(column.name, "price");
    assert_eq!(column.type_text, "DOUBLE");
    assert_eq!(column.constraint_text, "NOT NULL DEFAULT 0");

    let Statement::AlterTable(alter) = parse("alter table items modify price varchar(10)") else {
        panic!("expected ALTER TABLE");
    };
    assert!(matches!(alter.action, AlterAction::ModifyColumn(ref c) if c.type_text == "VARCHAR(10)"));

    let Statement::AlterTable(alter) = parse("ALTER TABLE items DROP COLUMN price;") else {
        panic!("expected ALTER TABLE");
    };
    assert_eq!(alter.action, AlterAction::DropColumn("price".to_string()));
}

#[test]
fn test_parse_insert() {
    let Statement::Insert(insert) = parse("INSERT INTO items (id, name) VALUES (1, 'pen');") else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.table, "items");
    assert_eq!(
        insert.columns,
        Some(vec!["id".to_string(), "name".to_string()])
    );
    assert_eq!(insert.values, vec![number("1"), string("pen")]);

    let Statement::Insert(insert) = parse("insert into items values(-2, \"cup\", NULL, true)") else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.columns, None);
    assert_eq!(
        insert.values,
        vec![
            Expression::unary(UnaryOperator::Minus, number("2")),
            string("cup"),
            Expression::literal(Literal::Null),
            Expression::literal(Literal::Boolean(true)),
        ]
    );
}

#[test]
fn test_parse_select_with_where_precedence() {
    let Statement::Select(select) = parse("SELECT id, name FROM items WHERE a = 1 OR b = 2 AND c = 3;") else {
        panic!("expected SELECT");
    };
    assert_eq!(
        select.projection,
        Projection::Columns(vec![ColumnRef::new("id"), ColumnRef::new("name")])
    );
    assert_eq!(select.from, TableRef::new("items"));
    assert_eq!(select.join, None);

    let expected = Expression::binary(
        Expression::eq(Expression::column("a"), number("1")),
        BinaryOperator::Or,
        Expression::binary(
            Expression::eq(Expression::column("b"), number("2")),
            BinaryOperator::And,
            Expression::eq(Expression::column("c"), number("3")),
        ),
    );
    assert_eq!(select.selection, Some(expected));
}

#[test]
fn test_parse_parentheses_null_tests_and_like() {
    let Statement::Select(select) =
        parse("SELECT * FROM t WHERE (a = 1 OR b = 2) AND c IS NOT NULL AND name NOT LIKE 'x%'")
    else {
        panic!("expected SELECT");
    };
    assert_eq!(select.projection, Projection::All);

    let expected = Expression::binary(
        Expression::binary(
            Expression::binary(
                Expression::eq(Expression::column("a"), number("1")),
                BinaryOperator::Or,
                Expression::eq(Expression::column("b"), number("2")),
            ),
            BinaryOperator::And,
            Expression::IsNull {
                expression: Box::new(Expression::column("c")),
                negated: true,
            },
        ),
        BinaryOperator::And,
        Expression::binary(Expression::column("name"), BinaryOperator::NotLike, string("x%")),
    );
    assert_eq!(select.selection, Some(expected));
}

#[test]
fn test_parse_unquoted_dates() {
    let Statement::Select(select) = parse("SELECT * FROM t WHERE d < 2020-01-01;") else {
        panic!("expected SELECT");
    };
    assert_eq!(
        select.selection,
        Some(Expression::binary(
            Expression::column("d"),
            BinaryOperator::LessThan,
            string("2020-01-01"),
        ))
    );

    let Statement::Insert(insert) = parse("INSERT INTO t VALUES (1, 2024-02-29);") else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.values, vec![number("1"), string("2024-02-29")]);

    // Spaced out or with short parts it is still subtraction.
    for sql in ["SELECT * FROM t WHERE d = 2020 - 01 - 01;", "SELECT * FROM t WHERE d = 2020-1-01;"] {
        let Statement::Select(select) = parse(sql) else {
            panic!("expected SELECT");
        };
        let Some(Expression::BinaryOp(op)) = select.selection else {
            panic!("expected a comparison in {sql}");
        };
        assert!(
            matches!(*op.right, Expression::BinaryOp(ref inner) if inner.operator == BinaryOperator::Subtract),
            "{sql}"
        );
    }
}

#[test]
fn test_bare_words_on_the_value_side() {
    let is_column = |name: &str| name == "name" || name == "other";

    let bound = Expression::binary(
        Expression::eq(Expression::column("name"), Expression::column("pen")),
        BinaryOperator::And,
        Expression::eq(Expression::column("name"), Expression::column("other")),
    )
    .bind_bare_words(&is_column);
    assert_eq!(
        bound,
        Expression::binary(
            Expression::eq(Expression::column("name"), string("pen")),
            BinaryOperator::And,
            Expression::eq(Expression::column("name"), Expression::column("other")),
        )
    );

    // The left side and qualified names are left for column checks to reject.
    let left = Expression::eq(Expression::column("nope"), number("1")).bind_bare_words(&is_column);
    assert_eq!(left, Expression::eq(Expression::column("nope"), number("1")));
    let qualified = Expression::Column(ColumnRef::with_table("t", "pen"));
    assert_eq!(qualified.clone().bind_value(&is_column), qualified);

    assert_eq!(Expression::column("cup").bind_value(&is_column), string("cup"));
    assert_eq!(Expression::column("name").bind_value(&is_column), Expression::column("name"));
}

#[test]
fn test_parse_join_with_aliases() {
    let Statement::Select(select) = parse(
        "SELECT e.name, d.title FROM emp e JOIN dept AS d ON e.dept_id = d.id WHERE d.id > 1;",
    ) else {
        panic!("expected SELECT");
    };
    assert_eq!(select.from, TableRef::with_alias("emp", "e"));
    let join = select.join.expect("join clause");
    assert_eq!(join.table, TableRef::with_alias("dept", "d"));
    assert_eq!(join.left, ColumnRef::with_table("e", "dept_id"));
    assert_eq!(join.right, ColumnRef::with_table("d", "id"));
    assert!(select.selection.is_some());

    assert!(SqlParser::new()
        .parse_sql("SELECT * FROM a LEFT JOIN b ON a.x = b.x")
        .is_err());
    assert!(SqlParser::new()
        .parse_sql("SELECT * FROM a JOIN b ON a.x = b.x JOIN c ON c.x = a.x")
        .is_err());
}

#[test]
fn test_parse_update_and_delete() {
    let Statement::Update(update) = parse("UPDATE items SET qty = qty + 5, name = 'x' WHERE id = 3;") else {
        panic!("expected UPDATE");
    };
    assert_eq!(update.table, "items");
    assert_eq!(update.assignments.len(), 2);
    assert_eq!(update.assignments[0].column, "qty");
    assert_eq!(
        update.assignments[0].value,
        Expression::binary(Expression::column("qty"), BinaryOperator::Add, number("5"))
    );
    assert!(update.selection.is_some());

    let Statement::Delete(delete) = parse("DELETE FROM items;") else {
        panic!("expected DELETE");
    };
    assert_eq!(delete.table, "items");
    assert_eq!(delete.selection, None);
}

#[test]
fn test_parse_backup_and_restore() {
    assert_eq!(
        parse("BACKUP DATABASE;"),
        Statement::Backup(BackupStatement {
            database: None,
            target: None
        })
    );
    assert_eq!(
        parse("backup database shop to '/tmp/shop.zip'"),
        Statement::Backup(BackupStatement {
            database: Some("shop".to_string()),
            target: Some("/tmp/shop.zip".to_string()),
        })
    );
    assert_eq!(
        parse("RESTORE DATABASE FROM 'shop.zip';"),
        Statement::Restore(RestoreStatement {
            database: None,
            source: "shop.zip".to_string(),
        })
    );
}

#[test]
fn test_syntax_errors_carry_usage() {
    let parser = SqlParser::new();

    let error = parser.parse_sql("INSERT items VALUES (1)").unwrap_err();
    assert!(matches!(error, PlannerError::InvalidSyntax { .. }));
    assert!(error.to_string().contains("INSERT INTO <table>"));

    assert!(matches!(
        parser.parse_sql("CREATE TABLE t (a INTEGER"),
        Err(PlannerError::UnbalancedParentheses)
    ));
    assert!(matches!(
        parser.parse_sql("GRANT ALL ON t"),
        Err(PlannerError::UnsupportedStatement(_))
    ));
    assert!(parser.parse_sql("").is_err());
    assert!(parser.parse_sql("SELECT * FROM t WHERE").is_err());
    assert!(parser.parse_sql("SHOW TABLES extra").is_err());
}
