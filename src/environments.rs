use crate::error::{Error, Result};
use crate::fs::open_file;
use crate::types::Environment;
use log::debug;
use serde_json::Value;
use std::{collections::HashMap, path::Path};

pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Environments indexed by every one of their aliases.
#[derive(Debug, Default, Clone)]
pub struct EnvironmentRegistry {
    environments: Vec<Environment>,
    aliases: HashMap<String, usize>,
}

impl EnvironmentRegistry {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(open_file(path)?)
    }

    /// A later record sharing an alias with an earlier one takes that alias over.
    pub fn load(records: Vec<Value>) -> Result<Self> {
        let mut registry = Self::default();
        for record in records {
            for field in ["names", "base_url"] {
                if record.get(field).is_none() {
                    return Err(Error::config(format!(
                        "Environment json object missing '{}' field: {}",
                        field, record
                    )));
                }
            }
            let environment: Environment = serde_json::from_value(record.clone()).map_err(|e| {
                Error::config(format!("Invalid environment json object {}: {}", record, e))
            })?;
            if environment.names.is_empty() {
                return Err(Error::config(format!(
                    "Environment json object has no names: {}",
                    record
                )));
            }
            let index = registry.environments.len();
            for name in &environment.names {
                if registry.aliases.insert(name.clone(), index).is_some() {
                    debug!("Environment alias {} redefined", name);
                }
            }
            registry.environments.push(environment);
        }
        Ok(registry)
    }

    pub fn find(&self, name: &str) -> Result<&Environment> {
        match self.aliases.get(name) {
            Some(&index) => Ok(&self.environments[index]),
            None if name == DEFAULT_ENVIRONMENT => Err(Error::user("no default environment set")),
            None => Err(Error::user(format!("unknown environment {}", name))),
        }
    }

    pub fn has_default(&self) -> bool {
        self.aliases.contains_key(DEFAULT_ENVIRONMENT)
    }
}
