use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Lines, Write},
    path::{Path, PathBuf},
};

use crate::{
    storage::{StagedFile, schema::TableSchema},
    types::{
        HEADER_LINES,
        error::{DatabaseError, Result},
        row::Row,
    },
};

/// The record file of one table: the schema header followed by one line per row.
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a header-only record file for a new table.
    pub fn create(&self, schema: &TableSchema) -> Result<()> {
        self.rewrite(schema, &[])
    }

    pub fn reader(&self) -> Result<RecordReader> {
        RecordReader::open(&self.path)
    }

    pub fn read_rows(&self) -> Result<Vec<Row>> {
        self.reader()?.collect()
    }

    pub fn append(&self, row: &Row) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let mut line = row.to_line();
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    /// Writes the schema header plus `rows` to a temporary file next to this one.
    pub fn stage<'a, I>(&self, schema: &TableSchema, rows: I) -> Result<StagedFile>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let header = schema.header_lines();
        let body = rows.into_iter().map(Row::to_line);
        StagedFile::write_lines(&self.path, header.into_iter().chain(body))
    }

    pub fn rewrite(&self, schema: &TableSchema, rows: &[Row]) -> Result<()> {
        self.stage(schema, rows)?.commit()
    }
}

/// Streams the data rows of a record file after validating its header.
pub struct RecordReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    header: Vec<Row>,
    width: usize,
    line_number: usize,
}

impl RecordReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let mut header = Vec::with_capacity(HEADER_LINES);
        for _ in 0..HEADER_LINES {
            match lines.next() {
                Some(line) => header.push(Row::from_line(&line?)),
                None => {
                    return Err(DatabaseError::MalformedSchema {
                        path: path.to_path_buf(),
                        reason: format!(
                            "expected {} header lines, found {}",
                            HEADER_LINES,
                            header.len()
                        ),
                    });
                }
            }
        }

        let width = header[0].len();
        Ok(Self {
            path: path.to_path_buf(),
            lines,
            header,
            width,
            line_number: HEADER_LINES,
        })
    }

    pub fn header(&self) -> &[Row] {
        &self.header
    }

    pub fn column_names(&self) -> &[String] {
        &self.header[0].values
    }
}

impl Iterator for RecordReader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e.into())),
        };
        self.line_number += 1;

        let row = Row::from_line(line.trim_end_matches('\r'));
        if row.len() != self.width {
            return Some(Err(DatabaseError::MalformedSchema {
                path: self.path.clone(),
                reason: format!(
                    "line {} has {} fields, the header has {}",
                    self.line_number,
                    row.len(),
                    self.width
                ),
            }));
        }
        Some(Ok(row))
    }
}
