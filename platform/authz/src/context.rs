use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{method::Method, realm::Realm};

/// Identifier passed to `get`, `update`, `patch` and `remove`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(value) => write!(f, "{value}"),
            Id::Text(value) => f.write_str(value),
        }
    }
}

impl Id {
    /// `0` and the empty string are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Id::Number(value) => *value == 0,
            Id::Text(value) => value.is_empty(),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Number(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::Text(value)
    }
}

/// Per-call parameter bag.
///
/// A call without `provider` came from inside the process and is trusted.
/// Authorization state lives in a private field that serde skips, so no
/// caller-supplied key can reach it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Params {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub query: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub(crate) realm: Option<Realm>,
}

impl Params {
    /// Params of a call arriving through `provider` (e.g. `rest`).
    pub fn external(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::default()
        }
    }

    pub fn internal() -> Self {
        Self::default()
    }

    /// Replaces the query with the fields of a JSON object. Any other value
    /// is ignored and the current query is kept.
    pub fn with_query(mut self, query: Value) -> Self {
        if let Value::Object(map) = query {
            self.query = map;
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_external(&self) -> bool {
        self.provider.is_some()
    }

    /// Authorization state recorded so far, if any rule wrote to it.
    pub fn realm(&self) -> Option<&Realm> {
        self.realm.as_ref()
    }
}

/// Everything a hook or rule sees about one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CallContext {
    /// Service name used in diagnostics.
    pub service: String,
    /// Registered path of the service.
    pub path: String,
    pub method: Method,
    pub id: Option<Id>,
    pub data: Option<Value>,
    pub params: Params,
}

impl CallContext {
    pub fn new(method: impl Into<Method>, params: Params) -> Self {
        Self {
            service: String::new(),
            path: String::new(),
            method: method.into(),
            id: None,
            data: None,
            params,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>, path: impl Into<String>) -> Self {
        self.service = service.into();
        self.path = path.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_external(&self) -> bool {
        self.params.is_external()
    }

    pub fn query(&self, key: &str) -> Option<&Value> {
        self.params.query.get(key)
    }
}
