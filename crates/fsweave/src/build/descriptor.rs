//! Loading tree descriptors from JSON.
//!
//! | JSON                                   | Descriptor          |
//! |----------------------------------------|---------------------|
//! | `"text"`                               | file contents       |
//! | `null`                                 | nothing             |
//! | `[a, b]`                               | sequence            |
//! | `{"name": ..}`                         | directory mapping   |
//! | `{"@dir": {"perm": .., "entries": ..}}`| explicit directory  |
//! | `{"@file": {"perm": .., "contents": ..}}` | explicit file    |
//! | `{"@symlink": "target"}`               | symbolic link       |
//!
//! Permissions are numbers or octal strings such as `"0755"`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::entry::{Dir, Entry, File, Symlink};
use super::{DEFAULT_DIR_PERM, DEFAULT_FILE_PERM};
use crate::error::{Error, Result};

const DIR_TAG: &str = "@dir";
const FILE_TAG: &str = "@file";
const SYMLINK_TAG: &str = "@symlink";

impl Entry {
    /// Decode a descriptor from a JSON value.
    ///
    /// Shapes that do not describe a tree (numbers, booleans, unknown `@`
    /// tags) fail with [`Error::Unsupported`] naming the offending path.
    pub fn from_json(value: &Value) -> Result<Entry> {
        decode(value, "/")
    }

    /// Parse and decode a descriptor from JSON text.
    pub fn from_json_str(text: &str) -> Result<Entry> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::InvalidDescriptor(e.to_string()))?;
        Entry::from_json(&value)
    }
}

fn decode(value: &Value, path: &str) -> Result<Entry> {
    match value {
        Value::Null => Ok(Entry::Empty),
        Value::String(contents) => Ok(Entry::Contents(contents.as_bytes().to_vec())),
        Value::Array(items) => items
            .iter()
            .map(|item| decode(item, path))
            .collect::<Result<Vec<_>>>()
            .map(Entry::Seq),
        Value::Object(object) => decode_object(object, path),
        Value::Bool(_) => Err(unsupported(path, "boolean")),
        Value::Number(_) => Err(unsupported(path, "number")),
    }
}

fn decode_object(object: &Map<String, Value>, path: &str) -> Result<Entry> {
    if let Some((tag, body)) = single_tag(object) {
        return match tag {
            DIR_TAG => decode_dir(body, path),
            FILE_TAG => decode_file(body, path),
            SYMLINK_TAG => match body {
                Value::String(target) => Ok(Entry::Symlink(Symlink::new(target))),
                _ => Err(unsupported(path, "symlink target")),
            },
            other => Err(unsupported(path, other)),
        };
    }
    decode_entries(object, path).map(Entry::Map)
}

fn single_tag(object: &Map<String, Value>) -> Option<(&str, &Value)> {
    let mut iter = object.iter();
    match (iter.next(), iter.next()) {
        (Some((key, value)), None) if key.starts_with('@') => Some((key.as_str(), value)),
        _ => None,
    }
}

fn decode_entries(object: &Map<String, Value>, path: &str) -> Result<BTreeMap<String, Entry>> {
    object
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode(value, &child(path, name))?)))
        .collect()
}

fn decode_dir(body: &Value, path: &str) -> Result<Entry> {
    let Value::Object(fields) = body else {
        return Err(unsupported(path, "directory body"));
    };
    let perm = perm_field(fields, path, DEFAULT_DIR_PERM)?;
    let entries = match fields.get("entries") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(entries)) => decode_entries(entries, path)?,
        Some(_) => return Err(unsupported(path, "directory entries")),
    };
    Ok(Entry::Dir(Dir { perm, entries }))
}

fn decode_file(body: &Value, path: &str) -> Result<Entry> {
    let Value::Object(fields) = body else {
        return Err(unsupported(path, "file body"));
    };
    let perm = perm_field(fields, path, DEFAULT_FILE_PERM)?;
    let contents = match fields.get("contents") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(text)) => text.as_bytes().to_vec(),
        Some(_) => return Err(unsupported(path, "file contents")),
    };
    Ok(Entry::File(File { perm, contents }))
}

fn perm_field(fields: &Map<String, Value>, path: &str, default: u32) -> Result<u32> {
    match fields.get("perm") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n <= 0o7777)
            .ok_or_else(|| Error::InvalidDescriptor(format!("{path}: invalid permissions {n}"))),
        Some(Value::String(text)) => parse_octal(text)
            .ok_or_else(|| Error::InvalidDescriptor(format!("{path}: invalid permissions {text:?}"))),
        Some(_) => Err(unsupported(path, "permissions")),
    }
}

/// Parse `"0755"`, `"755"` or `"0o755"`.
fn parse_octal(text: &str) -> Option<u32> {
    let digits = text.strip_prefix("0o").unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 8).ok().filter(|n| *n <= 0o7777)
}

fn child(path: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if path.ends_with('/') {
        format!("{path}{name}")
    } else {
        format!("{path}/{name}")
    }
}

fn unsupported(path: &str, kind: &str) -> Error {
    Error::Unsupported {
        path: PathBuf::from(path),
        kind: kind.to_string(),
    }
}
