//! File I/O utilities with atomic writes
//!
//! Month files, the rules file and settings are rewritten whole on every
//! mutation. Writes go to a temp file in the same directory which is then
//! renamed over the target, so a file holds either its old or its new content.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Read a whole text file
pub fn read_text<P: AsRef<Path>>(path: P) -> LedgerResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write a text file atomically (write to temp, then rename)
pub fn write_text_atomic<P: AsRef<Path>>(path: P, contents: &str) -> LedgerResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target, so the rename never crosses filesystems
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| LedgerError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    let written = writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .and_then(|_| writer.get_ref().sync_all());

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(LedgerError::Io(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LedgerError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    log::debug!("wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read YAML from a file, returning a default value if the file doesn't exist
pub fn read_yaml<T, P>(path: P) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let contents = read_text(path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&contents)
        .map_err(|e| LedgerError::Yaml(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write YAML atomically, with an optional leading comment block
pub fn write_yaml_atomic<T, P>(path: P, header: Option<&str>, data: &T) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let body = serde_yaml::to_string(data)?;
    let contents = match header {
        Some(header) => format!("{}\n{}", header.trim_end(), body),
        None => body,
    };
    write_text_atomic(path, &contents)
}

/// Read JSON from a file, returning `None` if the file doesn't exist
pub fn read_json_optional<T, P>(path: P) -> LedgerResult<Option<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .map_err(|e| LedgerError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map(Some)
        .map_err(|e| LedgerError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let contents = serde_json::to_string_pretty(data)?;
    write_text_atomic(path, &contents)
}
