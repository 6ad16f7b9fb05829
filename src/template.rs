//! Placeholder templates and their resolution.
//!
//! String leaves of a request definition may contain `{name}` placeholders.
//! `{uuid}` is replaced by a fresh v4 UUID, every other name is the name of a
//! request whose decoded response supplies the value. A bracket suffix such as
//! `{create_user[id]}` or `{list_users[0][name]}` picks a field out of that
//! response. `{{` and `}}` stand for literal braces.

use crate::chain::CallChain;
use crate::error::{Error, Result};
use log::debug;
use serde_json::{Map, Value};
use std::{collections::HashMap, fmt, iter::Peekable, str::Chars};
use uuid::Uuid;

pub const UUID_PARAMETER: &str = "uuid";

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Text(TextTemplate),
    List(Vec<Template>),
    Map(Vec<(String, Template)>),
    Literal(Value),
}

impl Template {
    pub fn parse(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::String(s) => Template::Text(TextTemplate::parse(s)?),
            Value::Array(items) => {
                Template::List(items.iter().map(Template::parse).collect::<Result<_>>()?)
            }
            Value::Object(obj) => Template::Map(
                obj.iter()
                    .map(|(k, v)| Template::parse(v).map(|t| (k.clone(), t)))
                    .collect::<Result<_>>()?,
            ),
            other => Template::Literal(other.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub path: Vec<String>,
}

impl Placeholder {
    /// Walks `path` into `value`. Numeric keys also index arrays.
    pub fn extract(&self, value: &Value) -> Result<Value> {
        let mut current = value;
        for (depth, key) in self.path.iter().enumerate() {
            let next = match current {
                Value::Object(obj) => obj.get(key),
                Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| Error::MissingField {
                placeholder: self.to_string(),
                request: self.name.clone(),
                path: self.path[..=depth]
                    .iter()
                    .map(|k| format!("[{}]", k))
                    .collect(),
            })?;
        }
        Ok(current.clone())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.name)?;
        for key in &self.path {
            write!(f, "[{}]", key)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextTemplate {
    segments: Vec<Segment>,
}

impl TextTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::Template {
            template: source.to_string(),
            reason: reason.to_string(),
        };
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}' encountered")),
                '{' => {
                    let placeholder = parse_field(&mut chars).map_err(invalid)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Distinct parameter names in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![];
        for p in self.placeholders() {
            if !names.contains(&p.name.as_str()) {
                names.push(&p.name);
            }
        }
        names
    }

    fn as_single_placeholder(&self) -> Option<&Placeholder> {
        match self.segments.as_slice() {
            [Segment::Placeholder(p)] => Some(p),
            _ => None,
        }
    }
}

fn parse_field(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Placeholder, &'static str> {
    let mut name = String::new();
    let mut path = vec![];
    loop {
        match chars.next() {
            None => return Err("expected '}' before end of string"),
            Some('}') => break,
            Some('{') => return Err("unexpected '{' in field name"),
            Some(':') | Some('!') => return Err("format specs and conversions are not supported"),
            Some('[') => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        None => return Err("missing ']' in placeholder"),
                        Some(']') => break,
                        Some(c) => key.push(c),
                    }
                }
                if key.is_empty() {
                    return Err("empty index in placeholder");
                }
                path.push(key);
                match chars.peek() {
                    Some('[') | Some('}') | None => {}
                    Some(_) => return Err("only '[' or '}' may follow ']'"),
                }
            }
            Some(c) => name.push(c),
        }
    }
    if name.is_empty() {
        return Err("empty placeholder name");
    }
    Ok(Placeholder { name, path })
}

/// Supplies the value of a placeholder that names another request.
pub trait ParameterSource {
    fn fetch(&self, request_name: &str, environment: &str, chain: &mut CallChain) -> Result<Value>;
}

pub struct Resolver<'s, S: ?Sized> {
    source: &'s S,
}

impl<'s, S: ParameterSource + ?Sized> Resolver<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source }
    }

    pub fn resolve(
        &self,
        template: &Template,
        environment: &str,
        chain: &mut CallChain,
    ) -> Result<Value> {
        match template {
            Template::Text(text) => {
                let values = self.bind(text, environment, chain)?;
                match text.as_single_placeholder() {
                    Some(p) => p.extract(&values[p.name.as_str()]),
                    None => substitute(text, &values).map(Value::String),
                }
            }
            Template::List(items) => items
                .iter()
                .map(|item| self.resolve(item, environment, chain))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Template::Map(entries) => {
                let mut obj = Map::new();
                for (key, value) in entries {
                    obj.insert(key.clone(), self.resolve(value, environment, chain)?);
                }
                Ok(Value::Object(obj))
            }
            Template::Literal(value) => Ok(value.clone()),
        }
    }

    /// Resolves `text` to its string form, even when it is a lone placeholder.
    pub fn render(
        &self,
        text: &TextTemplate,
        environment: &str,
        chain: &mut CallChain,
    ) -> Result<String> {
        let values = self.bind(text, environment, chain)?;
        substitute(text, &values)
    }

    pub fn resolve_parameter(
        &self,
        name: &str,
        environment: &str,
        chain: &mut CallChain,
    ) -> Result<Value> {
        if name == UUID_PARAMETER {
            return Ok(Value::String(Uuid::new_v4().to_string()));
        }
        debug!("Resolving parameter {} against {}", name, environment);
        self.source.fetch(name, environment, chain)
    }

    fn bind<'t>(
        &self,
        text: &'t TextTemplate,
        environment: &str,
        chain: &mut CallChain,
    ) -> Result<HashMap<&'t str, Value>> {
        let mut values = HashMap::new();
        for name in text.names() {
            let value = self.resolve_parameter(name, environment, chain)?;
            values.insert(name, value);
        }
        Ok(values)
    }
}

fn substitute(text: &TextTemplate, values: &HashMap<&str, Value>) -> Result<String> {
    let mut out = String::new();
    for segment in text.segments() {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Placeholder(p) => match p.extract(&values[p.name.as_str()])? {
                Value::String(s) => out.push_str(&s),
                other => out.push_str(&other.to_string()),
            },
        }
    }
    Ok(out)
}
