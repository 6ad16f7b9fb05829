//! Turns a named request into an HTTP call.
//!
//! Placeholders in the endpoint and body are resolved first, which may make
//! other calls against the same environment. Only a 200 response counts as
//! success.

use crate::chain::CallChain;
use crate::environments::EnvironmentRegistry;
use crate::error::{Error, Result};
use crate::requests::RequestCatalog;
use crate::template::{ParameterSource, Resolver};
use crate::types::{Environment, Method, ResponseJson};
use log::{debug, info};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Query(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub trait Transport {
    fn send(&self, request: &OutgoingRequest) -> Result<RawResponse>;
}

/// Blocking reqwest client with its default timeouts.
#[derive(Debug, Default, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl Transport for HttpTransport {
    fn send(&self, request: &OutgoingRequest) -> Result<RawResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.payload {
            Payload::Json(body) => builder.body(serde_json::to_vec(body)?),
            Payload::Query(params) => builder.query(params),
        };
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

pub struct Executor<'a, T = HttpTransport> {
    requests: &'a RequestCatalog,
    environments: &'a EnvironmentRegistry,
    transport: T,
    echo: bool,
}

impl<'a> Executor<'a, HttpTransport> {
    pub fn new(requests: &'a RequestCatalog, environments: &'a EnvironmentRegistry) -> Self {
        Self::with_transport(requests, environments, HttpTransport::default())
    }
}

impl<'a, T: Transport> Executor<'a, T> {
    pub fn with_transport(
        requests: &'a RequestCatalog,
        environments: &'a EnvironmentRegistry,
        transport: T,
    ) -> Self {
        Self {
            requests,
            environments,
            transport,
            echo: false,
        }
    }

    /// Print every response of a call chain as it arrives.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn make_call(&self, request_name: &str, environment: &str) -> Result<ResponseJson> {
        self.call(request_name, environment, &mut CallChain::default())
    }

    fn call(&self, name: &str, env_name: &str, chain: &mut CallChain) -> Result<ResponseJson> {
        let definition = self.requests.find(name)?;
        let environment = self.environments.find(env_name)?;
        let method: Method = definition.method.parse()?;
        let (endpoint, body) = definition.templates()?;

        chain.enter(name)?;
        debug!("Resolving {} at depth {}", name, chain.depth());
        let resolver = Resolver::new(self);
        let endpoint = resolver.render(&endpoint, env_name, chain)?;
        let body = resolver.resolve(&body, env_name, chain)?;
        chain.leave();

        let request = OutgoingRequest {
            method,
            url: format!("{}{}", environment.base_url, endpoint),
            headers: build_headers(environment),
            payload: build_payload(name, method, body)?,
        };
        info!("Making request {}: {} {}", name, method, request.url);
        let response = self.transport.send(&request)?;
        let decoded = decode(name, response)?;
        if self.echo {
            print_response(name, &decoded);
        }
        Ok(decoded)
    }
}

impl<T: Transport> ParameterSource for Executor<'_, T> {
    fn fetch(&self, request_name: &str, environment: &str, chain: &mut CallChain) -> Result<Value> {
        self.call(request_name, environment, chain)
    }
}

fn build_headers(environment: &Environment) -> Vec<(String, String)> {
    let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
    if let Some(extra) = &environment.headers {
        let mut extra: Vec<_> = extra.iter().collect();
        extra.sort();
        for (name, value) in extra {
            headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
    }
    headers
}

fn build_payload(name: &str, method: Method, body: Value) -> Result<Payload> {
    match method {
        Method::Post | Method::Put => Ok(Payload::Json(body)),
        Method::Get => query_pairs(name, body).map(Payload::Query),
    }
}

fn query_pairs(name: &str, body: Value) -> Result<Vec<(String, String)>> {
    let obj = match body {
        Value::Object(obj) => obj,
        Value::Null => return Ok(vec![]),
        other => {
            return Err(Error::user(format!(
                "GET request {} needs a mapping body for query parameters, got {}",
                name, other
            )))
        }
    };
    let mut pairs = vec![];
    for (key, value) in obj {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| (key.clone(), query_value(item))),
            ),
            other => pairs.push((key, query_value(other))),
        }
    }
    Ok(pairs)
}

fn query_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn decode(name: &str, response: RawResponse) -> Result<Value> {
    let parsed = serde_json::from_str::<Value>(&response.body);
    match parsed {
        Ok(body) if response.status == 200 => Ok(body),
        Ok(body) => Err(Error::Request {
            status: response.status,
            name: name.to_string(),
            body,
        }),
        Err(_) if response.status != 200 => Err(Error::Request {
            status: response.status,
            name: name.to_string(),
            body: Value::String(response.body),
        }),
        Err(source) => Err(Error::Decode {
            name: name.to_string(),
            source,
        }),
    }
}

fn print_response(name: &str, body: &Value) {
    println!("\x1b[32mName\x1b[m: \x1b[35m{}\x1b[m", name);
    println!();
    println!("\x1b[34mResponse\x1b[m: \x1b[36m{}\x1b[m", body);
    println!();
}
