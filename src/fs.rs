use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::{fs, path::Path};

/// Reads a json file holding either an array of records or a single record.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let file = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {:?}", path);
    parse_records(&file)
}

pub fn parse_records(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        other => Err(Error::config(format!(
            "Expected a json array of objects, got: {}",
            other
        ))),
    }
}
