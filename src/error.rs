use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing configuration records.
    #[error("{0}")]
    Config(String),

    /// Unknown request, unknown environment, unknown HTTP method.
    #[error("{0}")]
    User(String),

    #[error("invalid template {template:?}: {reason}")]
    Template { template: String, reason: String },

    #[error("placeholder {placeholder} has no value at {path} in the response of {request}")]
    MissingField {
        placeholder: String,
        request: String,
        path: String,
    },

    #[error("request {name} failed with status {status}: {body}")]
    Request {
        status: u16,
        name: String,
        body: Value,
    },

    #[error("dependency cycle detected: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("Failed to open file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response of {name} is not valid json: {source}")]
    Decode {
        name: String,
        source: serde_json::Error,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    User,
    Request,
    Cycle,
    /// Transport and decoding failures.
    Fatal,
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn user(msg: impl Into<String>) -> Self {
        Error::User(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Template { .. } | Error::Io { .. } | Error::Json(_) => {
                ErrorKind::Config
            }
            Error::User(_) | Error::MissingField { .. } => ErrorKind::User,
            Error::Request { .. } => ErrorKind::Request,
            Error::Cycle { .. } => ErrorKind::Cycle,
            Error::Decode { .. } | Error::Transport(_) => ErrorKind::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_error_display_names_status_and_request() {
        let err = Error::Request {
            status: 404,
            name: "get_user".to_string(),
            body: json!({"detail": "not found"}),
        };
        assert_eq!(
            err.to_string(),
            r#"request get_user failed with status 404: {"detail":"not found"}"#
        );
        assert_eq!(err.kind(), ErrorKind::Request);
    }

    #[test]
    fn cycle_error_lists_the_chain() {
        let err = Error::Cycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[test]
    fn user_and_config_errors_print_their_message() {
        assert_eq!(Error::user("unknown request x").to_string(), "unknown request x");
        assert_eq!(Error::config("bad").kind(), ErrorKind::Config);
    }
}
