use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::debug;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::types::error::{DatabaseError, Result};

/// Zips every file under `dir` into `target`, entry names relative to `dir`.
/// Returns the number of files archived.
pub fn archive_directory(dir: &Path, target: &Path) -> Result<usize> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    let count = {
        let mut zip = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let count = add_directory(&mut zip, dir, "", options)?;
        let mut writer = zip.finish()?;
        writer.flush()?;
        count
    };
    temp.persist(target).map_err(|e| e.error)?;

    debug!("Archived {} files from {} to {}", count, dir.display(), target.display());
    Ok(count)
}

fn add_directory<W: Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<usize> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut count = 0;
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_name = format!("{}{}", prefix, name);
        if entry.file_type()?.is_dir() {
            zip.add_directory(format!("{}/", entry_name), options)?;
            count += add_directory(zip, &entry.path(), &format!("{}/", entry_name), options)?;
        } else {
            zip.start_file(entry_name, options)?;
            let mut file = BufReader::new(File::open(entry.path())?);
            io::copy(&mut file, zip)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Unpacks `source` into `dir`, which must already exist. Entries that would
/// escape `dir` are rejected. Returns the number of files written.
pub fn extract_archive(source: &Path, dir: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(source)?))?;
    let mut count = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            DatabaseError::execution(format!(
                "archive entry '{}' points outside the database directory",
                entry.name()
            ))
        })?;
        let out_path = dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&out_path)?);
        io::copy(&mut entry, &mut out)?;
        out.flush()?;
        count += 1;
    }

    debug!("Extracted {} files from {} into {}", count, source.display(), dir.display());
    Ok(count)
}
