use std::{
    fs,
    path::Path,
};

use crate::{
    planner::{
        parser::SqlParser,
        statement::{ColumnConstraints, ColumnDefinition},
    },
    storage::StagedFile,
    types::{
        HEADER_LINES,
        error::{DatabaseError, Result},
        is_valid_name,
        row::Row,
        value::DataType,
    },
};

/// One column as recorded in the definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    /// Declared type, upper-cased, exactly as written to line 2.
    pub type_text: String,
    pub data_type: DataType,
    /// Raw constraint text, exactly as written to line 3.
    pub constraint_text: String,
    pub constraints: ColumnConstraints,
    pub position: usize,
}

impl ColumnSchema {
    pub fn new(
        name: &str,
        type_text: &str,
        constraint_text: &str,
        position: usize,
    ) -> Result<Self> {
        if !is_valid_name(name) {
            return Err(DatabaseError::InvalidName {
                kind: "column",
                name: name.to_string(),
            });
        }
        let type_text = type_text.trim().to_ascii_uppercase();
        let data_type = DataType::parse(&type_text)?;
        let constraint_text = constraint_text.trim().to_string();
        let constraints = SqlParser::new().parse_column_constraints(&constraint_text)?;

        Ok(Self {
            name: name.to_string(),
            type_text,
            data_type,
            constraint_text,
            constraints,
            position,
        })
    }

    pub fn from_definition(definition: &ColumnDefinition, position: usize) -> Result<Self> {
        Self::new(
            &definition.name,
            &definition.type_text,
            &definition.constraint_text,
            position,
        )
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.primary_key
    }

    /// NOT NULL, either declared or implied by PRIMARY KEY.
    pub fn is_not_null(&self) -> bool {
        self.constraints.not_null || self.constraints.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.unique
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Column list of one table; positions always equal vector indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_name: &str, columns: Vec<ColumnSchema>) -> Result<Self> {
        if columns.is_empty() {
            return Err(DatabaseError::execution(format!(
                "table '{}' must have at least one column",
                table_name
            )));
        }
        let mut schema = Self {
            table_name: table_name.to_string(),
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            schema.add_column(column)?;
        }
        Ok(schema)
    }

    pub fn from_definitions(table_name: &str, definitions: &[ColumnDefinition]) -> Result<Self> {
        let columns = definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| ColumnSchema::from_definition(definition, position))
            .collect::<Result<Vec<_>>>()?;
        Self::new(table_name, columns)
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|col| col.matches_name(name))
    }

    /// Get column index by name (case-insensitive)
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.matches_name(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn require_column_index(&self, name: &str) -> Result<usize> {
        self.get_column_index(name)
            .ok_or_else(|| DatabaseError::ColumnNotFound {
                name: name.to_string(),
                table: self.table_name.clone(),
            })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Names, types and constraints lines, as stored at the top of both table files.
    pub fn header_rows(&self) -> [Row; HEADER_LINES] {
        [
            Row::new(self.columns.iter().map(|c| c.name.clone()).collect()),
            Row::new(self.columns.iter().map(|c| c.type_text.clone()).collect()),
            Row::new(self.columns.iter().map(|c| c.constraint_text.clone()).collect()),
        ]
    }

    pub fn header_lines(&self) -> Vec<String> {
        self.header_rows().iter().map(Row::to_line).collect()
    }

    /// Rebuilds a schema from the first three lines of a table file.
    pub fn from_header_lines(table_name: &str, lines: &[String], path: &Path) -> Result<Self> {
        let malformed = |reason: String| DatabaseError::MalformedSchema {
            path: path.to_path_buf(),
            reason,
        };

        if lines.len() < HEADER_LINES {
            return Err(malformed(format!(
                "expected {} header lines, found {}",
                HEADER_LINES,
                lines.len()
            )));
        }

        let names = Row::from_line(&lines[0]);
        let types = Row::from_line(&lines[1]);
        let constraints = Row::from_line(&lines[2]);
        if names.len() != types.len() || names.len() != constraints.len() {
            return Err(malformed(format!(
                "header lines disagree on column count ({} names, {} types, {} constraints)",
                names.len(),
                types.len(),
                constraints.len()
            )));
        }

        let columns = names
            .values
            .iter()
            .zip(&types.values)
            .zip(&constraints.values)
            .enumerate()
            .map(|(position, ((name, type_text), constraint_text))| {
                ColumnSchema::new(name, type_text, constraint_text, position)
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| malformed(e.to_string()))?;

        Self::new(table_name, columns).map_err(|e| malformed(e.to_string()))
    }

    pub fn add_column(&mut self, mut column: ColumnSchema) -> Result<()> {
        if self.get_column(&column.name).is_some() {
            return Err(DatabaseError::DuplicateColumn { name: column.name });
        }
        column.position = self.columns.len();
        self.columns.push(column);
        Ok(())
    }

    /// Replaces type and constraints of an existing column in place.
    pub fn modify_column(&mut self, mut column: ColumnSchema) -> Result<usize> {
        let index = self.require_column_index(&column.name)?;
        column.position = index;
        // Keep the spelling the column was created with.
        column.name = self.columns[index].name.clone();
        self.columns[index] = column;
        Ok(index)
    }

    pub fn drop_column(&mut self, name: &str) -> Result<usize> {
        let index = self.require_column_index(name)?;
        if self.columns.len() == 1 {
            return Err(DatabaseError::execution(format!(
                "cannot drop '{}', the only column of table '{}'",
                self.columns[index].name, self.table_name
            )));
        }
        self.columns.remove(index);
        for (position, column) in self.columns.iter_mut().enumerate() {
            column.position = position;
        }
        Ok(index)
    }
}

pub fn read_schema(path: &Path, table_name: &str) -> Result<TableSchema> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<String> = content
        .lines()
        .take(HEADER_LINES)
        .map(str::to_string)
        .collect();
    TableSchema::from_header_lines(table_name, &lines, path)
}

pub fn stage_schema(path: &Path, schema: &TableSchema) -> Result<StagedFile> {
    StagedFile::write_lines(path, schema.header_lines())
}

pub fn write_schema(path: &Path, schema: &TableSchema) -> Result<()> {
    stage_schema(path, schema)?.commit()
}
