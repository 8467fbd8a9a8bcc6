pub mod backup;
pub mod catalog;
pub mod paths;
pub mod record;
pub mod schema;

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::types::error::{DatabaseError, Result};

/// A fully written replacement for a file, waiting to be renamed over it.
///
/// Content goes to a temporary file in the target's directory so that
/// `commit` is a same-filesystem rename. Dropping without committing
/// discards the temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn write_lines<I, S>(target: &Path, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = target.parent().ok_or_else(|| {
            DatabaseError::execution(format!("{} has no parent directory", target.display()))
        })?;
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            for line in lines {
                writer.write_all(line.as_ref().as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    pub fn commit(self) -> Result<()> {
        self.temp.persist(&self.target).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Commits staged files in order; used when two files must change together.
pub fn commit_all(staged: Vec<StagedFile>) -> Result<()> {
    for file in staged {
        file.commit()?;
    }
    Ok(())
}
