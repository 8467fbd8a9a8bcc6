use sqlparser::{
    dialect::GenericDialect,
    tokenizer::{Token, Tokenizer},
};

use crate::planner::{
    error::PlannerError,
    expression::{BinaryOperator, ColumnRef, Expression, Literal, UnaryOperator},
    statement::{
        AlterAction, AlterTableStatement, Assignment, BackupStatement, ColumnConstraints,
        ColumnDefinition, CreateTableStatement, DeleteStatement, ForeignKeyRef, InsertStatement,
        JoinClause, Projection, RestoreStatement, SelectStatement, Statement, TableRef,
        UpdateStatement,
    },
};

pub mod usage {
    pub const HELP: &str = "help;";
    pub const CREATE_DATABASE: &str = "CREATE DATABASE <name>;";
    pub const CREATE_TABLE: &str =
        "CREATE TABLE <name> (<column> <type> [constraints], ...);";
    pub const DROP: &str = "DROP DATABASE <name>; | DROP TABLE <name>;";
    pub const USE: &str = "USE <database>;";
    pub const SHOW: &str = "SHOW DATABASES; | SHOW TABLES;";
    pub const DESCRIBE: &str = "DESCRIBE <table>;";
    pub const ALTER: &str = "ALTER TABLE <table> ADD COLUMN <column> <type> [constraints]; | \
         ALTER TABLE <table> MODIFY COLUMN <column> <type> [constraints]; | \
         ALTER TABLE <table> DROP COLUMN <column>;";
    pub const INSERT: &str = "INSERT INTO <table> [(<column>, ...)] VALUES (<value>, ...);";
    pub const SELECT: &str = "SELECT <* | column, ...> FROM <table> [alias] \
         [JOIN <table> [alias] ON <a.column> = <b.column>] [WHERE <condition>];";
    pub const UPDATE: &str =
        "UPDATE <table> SET <column> = <expression>, ... [WHERE <condition>];";
    pub const DELETE: &str = "DELETE FROM <table> [WHERE <condition>];";
    pub const BACKUP: &str = "BACKUP DATABASE [name] [TO '<file.zip>'];";
    pub const RESTORE: &str = "RESTORE DATABASE [name] FROM '<file.zip>';";
}

/// Words that end a table reference instead of naming its alias.
const CLAUSE_KEYWORDS: &[&str] = &[
    "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER", "ON", "SET", "ORDER",
    "GROUP", "LIMIT", "VALUES",
];

static EOF_TOKEN: Token = Token::EOF;

pub struct SqlParser;

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses one statement, optionally terminated by `;`.
    pub fn parse_sql(&self, sql: &str) -> Result<Statement, PlannerError> {
        let mut tokens = TokenCursor::new(sql)?;
        tokens.check_balanced()?;

        let verb = match tokens.peek() {
            Token::Word(word) if word.quote_style.is_none() => word.value.to_ascii_lowercase(),
            Token::EOF => return Err(PlannerError::Unexpected("empty statement".to_string())),
            other => return Err(PlannerError::UnsupportedStatement(other.to_string())),
        };
        tokens.next_token();

        let (statement, usage) = match verb.as_str() {
            "help" => (Ok(Statement::Help), usage::HELP),
            "create" => {
                if tokens.parse_keyword("DATABASE") {
                    (Self::parse_create_database(&mut tokens), usage::CREATE_DATABASE)
                } else if tokens.parse_keyword("TABLE") {
                    (Self::parse_create_table(&mut tokens), usage::CREATE_TABLE)
                } else {
                    (
                        Err(tokens.unexpected("DATABASE or TABLE")),
                        usage::CREATE_TABLE,
                    )
                }
            }
            "drop" => (Self::parse_drop(&mut tokens), usage::DROP),
            "use" => (
                tokens
                    .parse_identifier("database name")
                    .map(|name| Statement::Use { name }),
                usage::USE,
            ),
            "show" => (Self::parse_show(&mut tokens), usage::SHOW),
            "describe" | "desc" => (
                tokens
                    .parse_identifier("table name")
                    .map(|table| Statement::Describe { table }),
                usage::DESCRIBE,
            ),
            "alter" => (Self::parse_alter(&mut tokens), usage::ALTER),
            "insert" => (Self::parse_insert(&mut tokens), usage::INSERT),
            "select" => (Self::parse_select(&mut tokens), usage::SELECT),
            "update" => (Self::parse_update(&mut tokens), usage::UPDATE),
            "delete" => (Self::parse_delete(&mut tokens), usage::DELETE),
            "backup" => (Self::parse_backup(&mut tokens), usage::BACKUP),
            "restore" => (Self::parse_restore(&mut tokens), usage::RESTORE),
            _ => return Err(PlannerError::UnsupportedStatement(verb)),
        };

        statement
            .and_then(|statement| tokens.expect_end().map(|_| statement))
            .map_err(|e| e.with_usage(usage))
    }

    /// Parses a standalone condition or arithmetic expression.
    pub fn parse_expression(&self, text: &str) -> Result<Expression, PlannerError> {
        let mut tokens = TokenCursor::new(text)?;
        tokens.check_balanced()?;
        let expression = tokens.parse_expression()?;
        tokens.expect_end()?;
        Ok(expression)
    }

    /// Parses the constraint text of one column, e.g. `PRIMARY KEY`,
    /// `NOT NULL CHECK (age >= 0)` or `REFERENCES dept(id)`.
    pub fn parse_column_constraints(&self, text: &str) -> Result<ColumnConstraints, PlannerError> {
        let mut tokens = TokenCursor::new(text)?;
        tokens.check_balanced()?;
        let mut constraints = ColumnConstraints::default();

        loop {
            let word = match tokens.next_token() {
                Token::EOF => break,
                Token::Word(word) if word.quote_style.is_none() => word.value.to_ascii_uppercase(),
                other => return Err(PlannerError::UnsupportedConstraint(other.to_string())),
            };
            match word.as_str() {
                "PRIMARY" => {
                    tokens.expect_keyword("KEY")?;
                    constraints.primary_key = true;
                }
                "NOT" => {
                    tokens.expect_keyword("NULL")?;
                    constraints.not_null = true;
                }
                "NULL" => {}
                "UNIQUE" => {
                    tokens.parse_keyword("KEY");
                    constraints.unique = true;
                }
                "DEFAULT" => {
                    let value = tokens.parse_unary()?;
                    if !value.referenced_columns().is_empty() {
                        return Err(PlannerError::Unexpected(
                            "DEFAULT must be a literal value".to_string(),
                        ));
                    }
                    constraints.default = Some(value);
                }
                "CHECK" => {
                    tokens.expect_token(&Token::LParen, "'(' after CHECK")?;
                    let start = tokens.position();
                    constraints.check = Some(tokens.parse_expression()?);
                    constraints.check_text = Some(tokens.text_between(start, tokens.position()));
                    tokens.expect_token(&Token::RParen, "')'")?;
                }
                "FOREIGN" => {
                    tokens.expect_keyword("KEY")?;
                    tokens.expect_keyword("REFERENCES")?;
                    constraints.references = Some(Self::parse_reference(&mut tokens)?);
                }
                "REFERENCES" => {
                    constraints.references = Some(Self::parse_reference(&mut tokens)?);
                }
                _ => return Err(PlannerError::UnsupportedConstraint(word)),
            }
        }

        Ok(constraints)
    }

    fn parse_reference(tokens: &mut TokenCursor) -> Result<ForeignKeyRef, PlannerError> {
        let table = tokens.parse_identifier("referenced table")?;
        let column = if tokens.consume(&Token::LParen) {
            let column = tokens.parse_identifier("referenced column")?;
            tokens.expect_token(&Token::RParen, "')'")?;
            Some(column)
        } else {
            None
        };
        Ok(ForeignKeyRef { table, column })
    }

    fn parse_create_database(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        let name = tokens.parse_identifier("database name")?;
        Ok(Statement::CreateDatabase { name })
    }

    fn parse_create_table(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        let table = tokens.parse_identifier("table name")?;
        tokens.expect_token(&Token::LParen, "'(' before the column list")?;

        let mut columns = Vec::new();
        loop {
            columns.push(Self::parse_column_definition(tokens, true)?);
            if tokens.consume(&Token::Comma) {
                continue;
            }
            tokens.expect_token(&Token::RParen, "',' or ')'")?;
            break;
        }

        Ok(Statement::CreateTable(CreateTableStatement { table, columns }))
    }

    /// `<name> <type>[(args)] <constraint text>`; inside a column list the
    /// constraint text ends at the next top-level comma or closing parenthesis.
    fn parse_column_definition(
        tokens: &mut TokenCursor,
        in_list: bool,
    ) -> Result<ColumnDefinition, PlannerError> {
        let name = tokens.parse_identifier("column name")?;
        let type_text = Self::parse_type(tokens)?;

        let start = tokens.position();
        let mut depth = 0usize;
        loop {
            match tokens.peek() {
                Token::EOF | Token::SemiColon => break,
                Token::Comma if depth == 0 && in_list => break,
                Token::RParen if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            tokens.next_token();
        }
        let constraint_text = tokens.text_between(start, tokens.position());

        // Reject unknown constraints up front; the text itself is what gets stored.
        SqlParser::new().parse_column_constraints(&constraint_text)?;

        Ok(ColumnDefinition {
            name,
            type_text,
            constraint_text,
        })
    }

    fn parse_type(tokens: &mut TokenCursor) -> Result<String, PlannerError> {
        let base = match tokens.next_token() {
            Token::Word(word) if word.quote_style.is_none() => word.value.to_ascii_uppercase(),
            other => {
                return Err(PlannerError::Unexpected(format!(
                    "expected a data type, found {}",
                    describe(&other)
                )));
            }
        };
        if !tokens.consume(&Token::LParen) {
            return Ok(base);
        }

        let mut args = Vec::new();
        loop {
            match tokens.next_token() {
                Token::Number(n, _) => args.push(n),
                other => {
                    return Err(PlannerError::Unexpected(format!(
                        "expected a number in {}(...), found {}",
                        base,
                        describe(&other)
                    )));
                }
            }
            if tokens.consume(&Token::Comma) {
                continue;
            }
            tokens.expect_token(&Token::RParen, "')'")?;
            break;
        }
        Ok(format!("{}({})", base, args.join(",")))
    }

    fn parse_drop(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        if tokens.parse_keyword("DATABASE") {
            let name = tokens.parse_identifier("database name")?;
            Ok(Statement::DropDatabase { name })
        } else if tokens.parse_keyword("TABLE") {
            let name = tokens.parse_identifier("table name")?;
            Ok(Statement::DropTable { name })
        } else {
            Err(tokens.unexpected("DATABASE or TABLE"))
        }
    }

    fn parse_show(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        if tokens.parse_keyword("DATABASES") {
            Ok(Statement::ShowDatabases)
        } else if tokens.parse_keyword("TABLES") {
            Ok(Statement::ShowTables)
        } else {
            Err(tokens.unexpected("DATABASES or TABLES"))
        }
    }

    fn parse_alter(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        tokens.expect_keyword("TABLE")?;
        let table = tokens.parse_identifier("table name")?;

        let action = if tokens.parse_keyword("ADD") {
            tokens.parse_keyword("COLUMN");
            AlterAction::AddColumn(Self::parse_column_definition(tokens, false)?)
        } else if tokens.parse_keyword("MODIFY") {
            tokens.parse_keyword("COLUMN");
            AlterAction::ModifyColumn(Self::parse_column_definition(tokens, false)?)
        } else if tokens.parse_keyword("DROP") {
            tokens.parse_keyword("COLUMN");
            AlterAction::DropColumn(tokens.parse_identifier("column name")?)
        } else {
            return Err(tokens.unexpected("ADD, MODIFY or DROP"));
        };

        Ok(Statement::AlterTable(AlterTableStatement { table, action }))
    }

    fn parse_insert(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        tokens.expect_keyword("INTO")?;
        let table = tokens.parse_identifier("table name")?;

        let columns = if tokens.consume(&Token::LParen) {
            let mut columns = Vec::new();
            loop {
                columns.push(tokens.parse_identifier("column name")?);
                if tokens.consume(&Token::Comma) {
                    continue;
                }
                tokens.expect_token(&Token::RParen, "',' or ')'")?;
                break;
            }
            Some(columns)
        } else {
            None
        };

        tokens.expect_keyword("VALUES")?;
        tokens.expect_token(&Token::LParen, "'(' after VALUES")?;
        let mut values = Vec::new();
        loop {
            values.push(tokens.parse_expression()?);
            if tokens.consume(&Token::Comma) {
                continue;
            }
            tokens.expect_token(&Token::RParen, "',' or ')'")?;
            break;
        }

        Ok(Statement::Insert(InsertStatement {
            table,
            columns,
            values,
        }))
    }

    fn parse_select(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        let projection = if tokens.consume(&Token::Mul) {
            Projection::All
        } else {
            let mut columns = Vec::new();
            loop {
                columns.push(tokens.parse_column_ref()?);
                if !tokens.consume(&Token::Comma) {
                    break;
                }
            }
            Projection::Columns(columns)
        };

        tokens.expect_keyword("FROM")?;
        let from = tokens.parse_table_ref()?;

        let join = if tokens.parse_keyword("INNER") {
            tokens.expect_keyword("JOIN")?;
            Some(Self::parse_join(tokens)?)
        } else if tokens.parse_keyword("JOIN") {
            Some(Self::parse_join(tokens)?)
        } else if ["LEFT", "RIGHT", "FULL", "CROSS"]
            .iter()
            .any(|kw| tokens.peek_keyword(kw))
        {
            return Err(PlannerError::Unexpected(
                "only INNER JOIN is supported".to_string(),
            ));
        } else {
            None
        };
        if tokens.peek_keyword("JOIN") || tokens.peek_keyword("INNER") || tokens.peek() == &Token::Comma {
            return Err(PlannerError::Unexpected(
                "only two tables can be joined".to_string(),
            ));
        }

        let selection = if tokens.parse_keyword("WHERE") {
            Some(tokens.parse_expression()?)
        } else {
            None
        };

        Ok(Statement::Select(SelectStatement {
            projection,
            from,
            join,
            selection,
        }))
    }

    fn parse_join(tokens: &mut TokenCursor) -> Result<JoinClause, PlannerError> {
        let table = tokens.parse_table_ref()?;
        tokens.expect_keyword("ON")?;
        let left = tokens.parse_column_ref()?;
        if !(tokens.consume(&Token::Eq) || tokens.consume(&Token::DoubleEq)) {
            return Err(tokens.unexpected("'=' in the JOIN condition"));
        }
        let right = tokens.parse_column_ref()?;
        Ok(JoinClause { table, left, right })
    }

    fn parse_update(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        let table = tokens.parse_identifier("table name")?;
        tokens.expect_keyword("SET")?;

        let mut assignments = Vec::new();
        loop {
            let column = tokens.parse_identifier("column name")?;
            if !(tokens.consume(&Token::Eq) || tokens.consume(&Token::DoubleEq)) {
                return Err(tokens.unexpected("'=' after the column name"));
            }
            let value = tokens.parse_expression()?;
            assignments.push(Assignment { column, value });
            if !tokens.consume(&Token::Comma) {
                break;
            }
        }

        let selection = if tokens.parse_keyword("WHERE") {
            Some(tokens.parse_expression()?)
        } else {
            None
        };

        Ok(Statement::Update(UpdateStatement {
            table,
            assignments,
            selection,
        }))
    }

    fn parse_delete(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        tokens.expect_keyword("FROM")?;
        let table = tokens.parse_identifier("table name")?;
        let selection = if tokens.parse_keyword("WHERE") {
            Some(tokens.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Delete(DeleteStatement { table, selection }))
    }

    fn parse_backup(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        tokens.expect_keyword("DATABASE")?;
        let database = if tokens.peek_identifier() && !tokens.peek_keyword("TO") {
            Some(tokens.parse_identifier("database name")?)
        } else {
            None
        };
        let target = if tokens.parse_keyword("TO") {
            Some(tokens.parse_string("archive path")?)
        } else {
            None
        };
        Ok(Statement::Backup(BackupStatement { database, target }))
    }

    fn parse_restore(tokens: &mut TokenCursor) -> Result<Statement, PlannerError> {
        tokens.expect_keyword("DATABASE")?;
        let database = if tokens.peek_identifier() && !tokens.peek_keyword("FROM") {
            Some(tokens.parse_identifier("database name")?)
        } else {
            None
        };
        tokens.expect_keyword("FROM")?;
        let source = tokens.parse_string("archive path")?;
        Ok(Statement::Restore(RestoreStatement { database, source }))
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::EOF => "end of input".to_string(),
        other => format!("'{}'", other),
    }
}

fn is_keyword(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Word(word) if word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword))
}

/// Whitespace-skipping cursor over the sqlparser token stream. Whitespace
/// tokens are kept so constraint text can be reproduced verbatim.
struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenCursor {
    fn new(sql: &str) -> Result<Self, PlannerError> {
        let dialect = GenericDialect {};
        let tokens = Tokenizer::new(&dialect, sql).tokenize()?;
        Ok(Self { tokens, index: 0 })
    }

    fn check_balanced(&self) -> Result<(), PlannerError> {
        let mut depth = 0i64;
        for token in &self.tokens {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(PlannerError::UnbalancedParentheses);
            }
        }
        if depth != 0 {
            return Err(PlannerError::UnbalancedParentheses);
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.index
    }

    fn text_between(&self, start: usize, end: usize) -> String {
        self.tokens[start..end]
            .iter()
            .map(|token| token.to_string())
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// An unquoted date such as `2020-01-01` arrives as `2020`, `-01`, `-01`
    /// with no whitespace in between. Consumes the tail and returns the whole
    /// date when `year` starts one.
    fn take_date_tail(&mut self, year: &str) -> Option<String> {
        let [Token::Minus, Token::Number(month, _), Token::Minus, Token::Number(day, _)] =
            self.tokens.get(self.index..self.index + 4)?
        else {
            return None;
        };
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !(digits(year, 4) && digits(month.as_str(), 2) && digits(day.as_str(), 2)) {
            return None;
        }
        let date = format!("{}-{}-{}", year, month, day);
        self.index += 4;
        Some(date)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens[self.index..]
            .iter()
            .filter(|token| !matches!(token, Token::Whitespace(_)))
            .nth(n)
            .unwrap_or(&EOF_TOKEN)
    }

    fn next_token(&mut self) -> Token {
        while let Some(token) = self.tokens.get(self.index) {
            self.index += 1;
            if !matches!(token, Token::Whitespace(_)) {
                return token.clone();
            }
        }
        Token::EOF
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        is_keyword(self.peek(), keyword)
    }

    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), PlannerError> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn consume(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token, what: &str) -> Result<(), PlannerError> {
        if self.consume(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> PlannerError {
        PlannerError::Unexpected(format!(
            "expected {}, found {}",
            expected,
            describe(self.peek())
        ))
    }

    fn expect_end(&mut self) -> Result<(), PlannerError> {
        while self.consume(&Token::SemiColon) {}
        match self.peek() {
            Token::EOF => Ok(()),
            other => Err(PlannerError::Unexpected(format!(
                "unexpected {} after the end of the statement",
                describe(other)
            ))),
        }
    }

    fn peek_identifier(&self) -> bool {
        matches!(self.peek(), Token::Word(word) if word.quote_style != Some('"'))
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String, PlannerError> {
        match self.peek() {
            Token::Word(word) if word.quote_style.is_none() || word.quote_style == Some('`') => {
                let value = word.value.clone();
                self.next_token();
                Ok(value)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn parse_string(&mut self, what: &str) -> Result<String, PlannerError> {
        match self.peek() {
            Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => {
                let value = s.clone();
                self.next_token();
                Ok(value)
            }
            Token::Word(word) if word.quote_style == Some('"') => {
                let value = word.value.clone();
                self.next_token();
                Ok(value)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef, PlannerError> {
        let first = self.parse_identifier("column name")?;
        if self.consume(&Token::Period) {
            let column = self.parse_identifier("column name")?;
            Ok(ColumnRef::with_table(first, column))
        } else {
            Ok(ColumnRef::new(first))
        }
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, PlannerError> {
        let name = self.parse_identifier("table name")?;
        let explicit_alias = self.parse_keyword("AS");
        let alias_follows = match self.peek() {
            Token::Word(word) if word.quote_style.is_none() => !CLAUSE_KEYWORDS
                .iter()
                .any(|kw| word.value.eq_ignore_ascii_case(kw)),
            Token::Word(_) => true,
            _ => false,
        };
        if alias_follows {
            let alias = self.parse_identifier("table alias")?;
            Ok(TableRef::with_alias(name, alias))
        } else if explicit_alias {
            Err(self.unexpected("table alias"))
        } else {
            Ok(TableRef::new(name))
        }
    }

    // expression := or
    fn parse_expression(&mut self) -> Result<Expression, PlannerError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, PlannerError> {
        let mut left = self.parse_and()?;
        while self.parse_keyword("OR") {
            let right = self.parse_and()?;
            left = Expression::binary(left, BinaryOperator::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, PlannerError> {
        let mut left = self.parse_not()?;
        while self.parse_keyword("AND") {
            let right = self.parse_not()?;
            left = Expression::binary(left, BinaryOperator::And, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, PlannerError> {
        if self.parse_keyword("NOT") {
            let inner = self.parse_not()?;
            return Ok(Expression::unary(UnaryOperator::Not, inner));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, PlannerError> {
        let left = self.parse_additive()?;

        let operator = match self.peek() {
            Token::Eq | Token::DoubleEq => Some(BinaryOperator::Equal),
            Token::Neq => Some(BinaryOperator::NotEqual),
            Token::Lt => Some(BinaryOperator::LessThan),
            Token::LtEq => Some(BinaryOperator::LessThanOrEqual),
            Token::Gt => Some(BinaryOperator::GreaterThan),
            Token::GtEq => Some(BinaryOperator::GreaterThanOrEqual),
            _ => None,
        };
        if let Some(operator) = operator {
            self.next_token();
            let right = self.parse_additive()?;
            return Ok(Expression::binary(left, operator, right));
        }

        if self.parse_keyword("LIKE") {
            let right = self.parse_additive()?;
            return Ok(Expression::binary(left, BinaryOperator::Like, right));
        }
        if self.peek_keyword("NOT") && is_keyword(self.peek_nth(1), "LIKE") {
            self.next_token();
            self.next_token();
            let right = self.parse_additive()?;
            return Ok(Expression::binary(left, BinaryOperator::NotLike, right));
        }
        if self.parse_keyword("IS") {
            let negated = self.parse_keyword("NOT");
            self.expect_keyword("NULL")?;
            return Ok(Expression::IsNull {
                expression: Box::new(left),
                negated,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, PlannerError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let operator = match self.peek() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.next_token();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, operator, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, PlannerError> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.peek() {
                Token::Mul => BinaryOperator::Multiply,
                Token::Div => BinaryOperator::Divide,
                _ => return Ok(left),
            };
            self.next_token();
            let right = self.parse_unary()?;
            left = Expression::binary(left, operator, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, PlannerError> {
        if self.consume(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expression::unary(UnaryOperator::Minus, inner));
        }
        if self.consume(&Token::Plus) {
            let inner = self.parse_unary()?;
            return Ok(Expression::unary(UnaryOperator::Plus, inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, PlannerError> {
        match self.next_token() {
            Token::Number(n, _) => match self.take_date_tail(&n) {
                Some(date) => Ok(Expression::literal(Literal::String(date))),
                None => Ok(Expression::literal(Literal::Number(n))),
            },
            Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => {
                Ok(Expression::literal(Literal::String(s)))
            }
            // "text" is a string literal in this dialect, not a quoted identifier.
            Token::Word(word) if word.quote_style == Some('"') => {
                Ok(Expression::literal(Literal::String(word.value)))
            }
            Token::Word(word) => {
                if word.quote_style.is_none() {
                    match word.value.to_ascii_uppercase().as_str() {
                        "NULL" => return Ok(Expression::literal(Literal::Null)),
                        "TRUE" => return Ok(Expression::literal(Literal::Boolean(true))),
                        "FALSE" => return Ok(Expression::literal(Literal::Boolean(false))),
                        _ => {}
                    }
                }
                if self.consume(&Token::Period) {
                    let column = self.parse_identifier("column name")?;
                    Ok(Expression::Column(ColumnRef::with_table(word.value, column)))
                } else {
                    Ok(Expression::Column(ColumnRef::new(word.value)))
                }
            }
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect_token(&Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(PlannerError::Unexpected(format!(
                "expected an expression, found {}",
                describe(&other)
            ))),
        }
    }
}
