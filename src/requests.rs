use crate::error::{Error, Result};
use crate::fs::open_file;
use crate::types::{RequestDefinition, RequestRecord};
use log::debug;
use serde_json::Value;
use std::{collections::HashMap, path::Path};

const REQUIRED_FIELDS: [&str; 4] = ["name", "endpoint", "type", "body"];

#[derive(Debug, Default, Clone)]
pub struct RequestCatalog {
    requests: Vec<RequestDefinition>,
    index: HashMap<String, usize>,
}

impl RequestCatalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(open_file(path)?)
    }

    /// A redefined name keeps its first position and takes the last definition.
    pub fn load(records: Vec<Value>) -> Result<Self> {
        let mut catalog = Self::default();
        for record in records {
            for field in REQUIRED_FIELDS {
                if record.get(field).is_none() {
                    return Err(Error::config(format!(
                        "Request json object missing '{}' field: {}",
                        field, record
                    )));
                }
            }
            let parsed: RequestRecord = serde_json::from_value(record.clone()).map_err(|e| {
                Error::config(format!("Invalid request json object {}: {}", record, e))
            })?;
            let name = parsed.name.clone();
            let definition = RequestDefinition::from(parsed);
            match catalog.index.get(&name) {
                Some(&i) => {
                    debug!("Request {} redefined", name);
                    catalog.requests[i] = definition;
                }
                None => {
                    catalog.index.insert(name, catalog.requests.len());
                    catalog.requests.push(definition);
                }
            }
        }
        Ok(catalog)
    }

    pub fn find(&self, name: &str) -> Result<&RequestDefinition> {
        self.index
            .get(name)
            .map(|&i| &self.requests[i])
            .ok_or_else(|| Error::user(format!("unknown request {}", name)))
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.requests
            .iter()
            .map(|r| (r.name.as_str(), r.description.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn catalog(records: Value) -> Result<RequestCatalog> {
        match records {
            Value::Array(records) => RequestCatalog::load(records),
            _ => unreachable!(),
        }
    }

    #[test]
    fn finds_loaded_requests() {
        let catalog = catalog(json!([
            {"name": "ping", "endpoint": "/health", "type": "GET", "body": {}},
            {"name": "create_user", "endpoint": "/users", "type": "POST",
             "body": {"id": "{uuid}"}, "description": "Make a user"}
        ]))
        .unwrap();
        assert_eq!(catalog.list().count(), 2);
        assert_eq!(catalog.find("ping").unwrap().method, "GET");
        assert_eq!(
            catalog.find("create_user").unwrap().description.as_deref(),
            Some("Make a user")
        );
        let err = catalog.find("nope").unwrap_err();
        assert_eq!(err.to_string(), "unknown request nope");
        assert_eq!(err.kind(), ErrorKind::User);
    }

    #[test]
    fn list_keeps_load_order() {
        let catalog = catalog(json!([
            {"name": "b", "endpoint": "/b", "type": "GET", "body": {}},
            {"name": "a", "endpoint": "/a", "type": "GET", "body": {}, "description": "first a"},
            {"name": "b", "endpoint": "/b2", "type": "POST", "body": {}, "description": "second b"}
        ]))
        .unwrap();
        let listed: Vec<_> = catalog.list().collect();
        assert_eq!(listed, vec![("b", Some("second b")), ("a", Some("first a"))]);
        assert_eq!(catalog.find("b").unwrap().method, "POST");
    }

    #[test]
    fn each_required_field_is_checked() {
        let full = json!({"name": "x", "endpoint": "/x", "type": "GET", "body": {}});
        for field in REQUIRED_FIELDS {
            let mut record = full.clone();
            record.as_object_mut().unwrap().remove(field);
            let err = RequestCatalog::load(vec![record]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(
                err.to_string()
                    .starts_with(&format!("Request json object missing '{}' field", field)),
                "{}",
                err
            );
        }
    }

    #[test]
    fn a_null_body_counts_as_present() {
        let catalog = catalog(json!([{"name": "x", "endpoint": "/x", "type": "GET", "body": null}]))
            .unwrap();
        assert!(catalog.find("x").is_ok());
    }

    #[test]
    fn unknown_methods_load_fine() {
        let catalog =
            catalog(json!([{"name": "x", "endpoint": "/x", "type": "PATCH", "body": {}}])).unwrap();
        assert_eq!(catalog.find("x").unwrap().method, "PATCH");
    }

    #[test]
    fn malformed_templates_do_not_block_loading() {
        let catalog = catalog(json!([
            {"name": "ping", "endpoint": "/health", "type": "GET", "body": {}},
            {"name": "raw", "endpoint": "/raw", "type": "POST", "body": {"payload": "{\"a\": 1}"}}
        ]))
        .unwrap();
        let listed: Vec<_> = catalog.list().map(|(name, _)| name).collect();
        assert_eq!(listed, vec!["ping", "raw"]);
        assert!(catalog.find("ping").unwrap().templates().is_ok());
        let err = catalog.find("raw").unwrap().templates().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
