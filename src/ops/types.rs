//! Operation descriptors and parameter marshaling

use crate::pagination::{NextPage, Pagination};
use crate::types::Method;
use serde_json::{Map, Value};

/// Keys that name the resource a call is scoped to, in lookup order
///
/// `from`/`to` come last: records calls name their table that way.
pub const RESOURCE_KEYS: &[&str] = &["tableId", "childTableId", "appId", "dbid", "from", "to"];

/// Param key whose value is sent verbatim as the request body
pub const BODY_KEY: &str = "body";

/// Request body shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// No body
    None,
    /// JSON body built from the params left after path and query
    Json,
    /// Raw text from the `body` param (QBL documents)
    Text,
}

/// Response body shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// JSON document
    Json,
    /// Raw text, returned as a string value
    Text,
}

/// Static description of one API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDef {
    /// Wire name, e.g. `getApp`
    pub name: &'static str,
    /// Client method name, e.g. `get_app`
    pub fn_name: &'static str,
    /// HTTP verb
    pub method: Method,
    /// Path template with `{param}` placeholders
    pub path: &'static str,
    /// Params sent in the query string
    pub query: &'static [&'static str],
    /// Request body shape
    pub body: BodyKind,
    /// Response body shape
    pub response: ResponseKind,
    /// Paging behaviour
    pub pagination: Pagination,
}

/// A request split out of a flat parameter object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marshaled {
    /// Percent-decoded path segments, relative to the API base
    pub segments: Vec<String>,
    /// Query parameters, in declaration order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Raw text body
    pub text: Option<String>,
    /// Resource id used for temporary tokens
    pub resource: Option<String>,
}

impl OperationDef {
    /// Placeholder names in the path template
    pub fn path_params(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(|s| s.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
    }

    /// Split `params` into path segments, query pairs and body
    ///
    /// Never fails: a missing path param becomes an empty segment and a
    /// missing query param is left out, so the server reports the problem.
    pub fn marshal(&self, params: &Value) -> Marshaled {
        let empty = Map::new();
        let object = params.as_object().unwrap_or(&empty);
        let mut consumed: Vec<&str> = Vec::new();

        let segments = self
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        consumed.push(name);
                        object.get(name).and_then(param_string).unwrap_or_default()
                    }
                    None => segment.to_string(),
                }
            })
            .collect();

        let mut query = Vec::new();
        for name in self.query {
            consumed.push(*name);
            if let Some(value) = object.get(*name).and_then(param_string) {
                query.push(((*name).to_string(), value));
            }
        }

        let (body, text) = match self.body {
            BodyKind::None => (None, None),
            BodyKind::Json => (Some(json_body(params, object, &consumed)), None),
            BodyKind::Text => (None, object.get(BODY_KEY).and_then(param_string)),
        };

        Marshaled {
            segments,
            query,
            body,
            text,
            resource: resource_id(params),
        }
    }
}

/// Body for a JSON operation
///
/// A non-object `params` (an array of ids, say) is the body itself; a
/// `body` key is taken verbatim; otherwise every unconsumed key is sent.
fn json_body(params: &Value, object: &Map<String, Value>, consumed: &[&str]) -> Value {
    if !params.is_object() && !params.is_null() {
        return params.clone();
    }
    if let Some(body) = object.get(BODY_KEY) {
        return body.clone();
    }
    Value::Object(
        object
            .iter()
            .filter(|(k, _)| !consumed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// Render a param for a path segment or query string
fn param_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(param_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// First resource id present in `params`
pub fn resource_id(params: &Value) -> Option<String> {
    RESOURCE_KEYS.iter().find_map(|key| match params.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

impl Marshaled {
    /// Value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge a pagination cursor into this request
    pub fn apply(&mut self, next: &NextPage) {
        let NextPage::Continue {
            query_params,
            body_fields,
        } = next
        else {
            return;
        };

        for (key, value) in query_params {
            match self.query.iter().position(|(k, _)| k == key) {
                Some(i) => self.query[i].1.clone_from(value),
                None => self.query.push((key.clone(), value.clone())),
            }
        }

        for (path, value) in body_fields {
            let body = self
                .body
                .get_or_insert_with(|| Value::Object(Map::new()));
            set_path(body, path, value.clone());
        }
    }
}

/// Set a nested field, creating intermediate objects
fn set_path(target: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = target;
    for key in parents {
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
    }

    if let Value::Object(map) = current {
        map.insert(last.clone(), value);
    }
}
