//! Idempotent file materialization under the target directory.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use stacksmith_types::ScaffoldError;

/// Marker file name for kept directories.
const KEEP_FILE: &str = ".gitkeep";

/// One file to place under the target directory.
#[derive(Debug, Clone)]
pub enum FileEntry {
    /// Plain file, written verbatim over any previous content.
    Text { rel: String, content: String },
    /// JSON document merged into whatever already exists at the path.
    Json { rel: String, patch: Value },
    /// Lines appended only when their key is not already present. Used for
    /// env-style files several operations extend independently.
    AppendMissing { rel: String, lines: Vec<String> },
    /// Keep-marker for an otherwise-empty directory tracked in version
    /// control. Skipped when the directory already holds real content.
    KeepDir { rel: String },
}

impl FileEntry {
    pub fn text(rel: impl Into<String>, content: impl Into<String>) -> Self {
        FileEntry::Text {
            rel: rel.into(),
            content: content.into(),
        }
    }

    pub fn json(rel: impl Into<String>, patch: Value) -> Self {
        FileEntry::Json {
            rel: rel.into(),
            patch,
        }
    }

    pub fn append_missing(rel: impl Into<String>, lines: &[&str]) -> Self {
        FileEntry::AppendMissing {
            rel: rel.into(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }

    pub fn keep_dir(rel: impl Into<String>) -> Self {
        FileEntry::KeepDir { rel: rel.into() }
    }

    pub fn rel(&self) -> &str {
        match self {
            FileEntry::Text { rel, .. }
            | FileEntry::Json { rel, .. }
            | FileEntry::AppendMissing { rel, .. }
            | FileEntry::KeepDir { rel } => rel,
        }
    }
}

/// Write every entry under `target`, creating parent directories as needed.
/// Entries are applied in order; the first I/O failure aborts with the
/// offending path.
pub fn write_entries(target: &Path, entries: &[FileEntry]) -> Result<(), ScaffoldError> {
    for entry in entries {
        write_entry(target, entry)?;
    }
    Ok(())
}

fn write_entry(target: &Path, entry: &FileEntry) -> Result<(), ScaffoldError> {
    debug!(rel = entry.rel(), "materializing entry");
    match entry {
        FileEntry::Text { rel, content } => {
            let path = target.join(rel);
            ensure_parent(&path)?;
            std::fs::write(&path, content).map_err(|source| io_error(&path, source))
        }
        FileEntry::Json { rel, patch } => merge_json_file(&target.join(rel), patch),
        FileEntry::AppendMissing { rel, lines } => append_missing_lines(&target.join(rel), lines),
        FileEntry::KeepDir { rel } => write_keep_marker(&target.join(rel)),
    }
}

/// Read-modify-write JSON merge. Objects merge key-wise with incoming keys
/// winning on scalars and sibling keys untouched; independent operations
/// extend the same manifest across invocations, so replacing the whole
/// document would lose earlier registrations.
pub fn merge_json_file(path: &Path, patch: &Value) -> Result<(), ScaffoldError> {
    ensure_parent(path)?;
    let mut document = match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "existing document is not valid JSON; rewriting");
            Value::Null
        }),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Value::Null,
        Err(error) => return Err(io_error(path, error)),
    };
    merge_value(&mut document, patch);
    let serialized =
        serde_json::to_string_pretty(&document).map_err(|error| io_error(path, std::io::Error::other(error)))?;
    std::fs::write(path, serialized + "\n").map_err(|source| io_error(path, source))
}

/// Recursive merge: incoming objects merge into existing objects, everything
/// else overwrites.
pub fn merge_value(existing: &mut Value, patch: &Value) {
    match (existing, patch) {
        (Value::Object(existing_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match existing_map.get_mut(key) {
                    Some(existing_value) => merge_value(existing_value, patch_value),
                    None => {
                        existing_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (existing_slot, patch_value) => *existing_slot = patch_value.clone(),
    }
}

/// Append lines whose key (the part before `=`, or the whole line otherwise)
/// is not already present. Values the user has edited are left alone.
fn append_missing_lines(path: &Path, lines: &[String]) -> Result<(), ScaffoldError> {
    ensure_parent(path)?;
    let current = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(error) => return Err(io_error(path, error)),
    };
    let existing_keys: BTreeSet<String> = current.lines().map(line_key).collect();

    let mut updated = current.clone();
    for line in lines {
        if existing_keys.contains(&line_key(line)) {
            continue;
        }
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(line);
        updated.push('\n');
    }
    if updated != current {
        std::fs::write(path, updated).map_err(|source| io_error(path, source))?;
    }
    Ok(())
}

fn line_key(line: &str) -> String {
    match line.split_once('=') {
        Some((key, _)) => key.trim().to_string(),
        None => line.trim().to_string(),
    }
}

/// Write a keep-marker into `dir` unless the directory already holds real
/// content. A directory populated by an earlier step keeps its files; marker
/// and README entries do not count as content.
fn write_keep_marker(dir: &Path) -> Result<(), ScaffoldError> {
    std::fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
    for entry in std::fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_ignorable_entry(&name) {
            debug!(dir = %dir.display(), "directory already populated; keep marker not written");
            return Ok(());
        }
    }
    let marker = dir.join(KEEP_FILE);
    std::fs::write(&marker, "").map_err(|source| io_error(&marker, source))
}

fn is_ignorable_entry(name: &str) -> bool {
    name == KEEP_FILE || name == ".keep" || name.to_ascii_lowercase().starts_with("readme")
}

fn ensure_parent(path: &Path) -> Result<(), ScaffoldError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> ScaffoldError {
    ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    }
}
