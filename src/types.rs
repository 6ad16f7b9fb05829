use crate::error::{Error, Result as CrateResult};
use crate::template::{Template, TextTemplate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, fmt, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Environment {
    pub names: Vec<String>,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

/// A request record as it appears in the requests file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RequestRecord {
    pub name: String,
    pub endpoint: String,
    #[serde(rename = "type")]
    pub method: String,
    pub body: Value,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefinition {
    pub name: String,
    pub endpoint: String,
    /// Kept verbatim; checked against [`Method`] when the request is called.
    pub method: String,
    pub body: Value,
    pub description: Option<String>,
}

impl RequestDefinition {
    /// Parses the endpoint and body templates. A bad template only fails the
    /// request that carries it.
    pub fn templates(&self) -> CrateResult<(TextTemplate, Template)> {
        let invalid =
            |e: Error| Error::config(format!("Request {} has an invalid template: {}", self.name, e));
        let endpoint = TextTemplate::parse(&self.endpoint).map_err(invalid)?;
        let body = Template::parse(&self.body).map_err(invalid)?;
        Ok((endpoint, body))
    }
}

impl From<RequestRecord> for RequestDefinition {
    fn from(record: RequestRecord) -> Self {
        Self {
            name: record.name,
            endpoint: record.endpoint,
            method: record.method,
            body: record.body,
            description: record.description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            other => Err(Error::user(format!("unknown HTTP method {}", other))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

pub type ResponseJson = Value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_parsing_is_exact() {
        assert_eq!("PUT".parse::<Method>().unwrap(), Method::Put);
        let err = "get".parse::<Method>().unwrap_err();
        assert_eq!(err.to_string(), "unknown HTTP method get");
        assert!("DELETE".parse::<Method>().is_err());
    }

    #[test]
    fn request_record_uses_type_field() {
        let record: RequestRecord = serde_json::from_value(json!({
            "name": "ping", "endpoint": "/health", "type": "GET", "body": {}
        }))
        .unwrap();
        let definition = RequestDefinition::from(record);
        assert_eq!(definition.method, "GET");
        assert_eq!(definition.description, None);
        let (_, body) = definition.templates().unwrap();
        assert_eq!(body, Template::Map(vec![]));
    }

    #[test]
    fn bad_templates_name_their_request() {
        let record: RequestRecord = serde_json::from_value(json!({
            "name": "raw", "endpoint": "/raw", "type": "POST", "body": {"payload": "{\"a\": 1}"}
        }))
        .unwrap();
        let err = RequestDefinition::from(record).templates().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Request raw has an invalid template"));
    }
}
