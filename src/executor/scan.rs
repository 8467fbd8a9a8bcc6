use crate::{
    executor::{
        TableHandle,
        predicate::{Predicate, SchemaRow, validate_columns},
    },
    planner::statement::TableRef,
    storage::{record::RecordReader, schema::TableSchema},
    types::{
        error::{DatabaseError, Result},
        row::Row,
    },
};

pub trait Scanner {
    fn scan(&mut self) -> Result<Option<Row>>;
}

/// Streams the rows of one table, keeping those that satisfy an optional predicate.
pub struct TableScanner {
    schema: TableSchema,
    reader: RecordReader,
    predicate: Option<Predicate>,
    table_ref: Option<TableRef>,
}

impl TableScanner {
    pub fn new(handle: &TableHandle, predicate: Option<Predicate>) -> Result<Self> {
        let schema = handle.schema()?;
        if let Some(predicate) = &predicate {
            predicate.validate_against_schema(&schema)?;
        }
        Self::with_schema(handle, schema, predicate)
    }

    /// Scanner whose predicate may qualify columns with `table_ref`'s alias.
    pub fn with_table_ref(
        handle: &TableHandle,
        table_ref: TableRef,
        predicate: Option<Predicate>,
    ) -> Result<Self> {
        let schema = handle.schema()?;
        if let Some(predicate) = &predicate {
            validate_columns(predicate.expression(), &schema, Some(&table_ref))?;
        }
        let mut scanner = Self::with_schema(handle, schema, predicate)?;
        scanner.table_ref = Some(table_ref);
        Ok(scanner)
    }

    fn with_schema(
        handle: &TableHandle,
        schema: TableSchema,
        predicate: Option<Predicate>,
    ) -> Result<Self> {
        let reader = handle.records.reader()?;
        if reader.column_names().len() != schema.width() {
            return Err(DatabaseError::MalformedSchema {
                path: handle.records.path().to_path_buf(),
                reason: format!(
                    "record header has {} columns but the definition has {}",
                    reader.column_names().len(),
                    schema.width()
                ),
            });
        }
        Ok(Self {
            schema,
            reader,
            predicate,
            table_ref: None,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn matches(&self, row: &Row) -> Result<bool> {
        let Some(predicate) = &self.predicate else {
            return Ok(true);
        };
        match &self.table_ref {
            Some(table_ref) => predicate.evaluate(&SchemaRow::with_table(&self.schema, row, table_ref)),
            None => predicate.evaluate(&SchemaRow::new(&self.schema, row)),
        }
    }
}

impl Scanner for TableScanner {
    fn scan(&mut self) -> Result<Option<Row>> {
        while let Some(row) = self.reader.next() {
            let row = row?;
            if self.matches(&row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}

pub struct ScanIterator<S: Scanner> {
    scanner: S,
}

impl<S: Scanner> ScanIterator<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }
}

impl<S: Scanner> Iterator for ScanIterator<S> {
    type Item = Result<Row>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.scanner.scan() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
