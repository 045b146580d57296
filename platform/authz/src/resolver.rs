//! Rule key resolution.
//!
//! A rule key applies to a verb when, checked in this order:
//!
//! 1. the key equals the verb;
//! 2. the key is `read` and the verb is `find` or `get`;
//! 3. the key is `write` and the verb is `create`, `update`, `patch` or `remove`;
//! 4. the key is `all`;
//! 5. the key is not a keyword or standard verb name, and one of its letters
//!    maps to the verb (`c f g p r u`).
//!
//! Keywords and verb names are never split into letters, so `update` does not
//! cover `patch` and `read` does not cover `remove`.

use std::fmt;

use crate::{error::RuleKeyError, method::Method};

pub const READ: &str = "read";
pub const WRITE: &str = "write";
pub const ALL: &str = "all";

/// True for `read`, `write`, `all` and the six standard verb names.
pub fn is_reserved(key: &str) -> bool {
    matches!(key, READ | WRITE | ALL) || Method::standard(key).is_some()
}

/// Whether the rule key `key` applies to an invocation of `method`.
pub fn resolves(key: &str, method: &str) -> bool {
    if key == method {
        return true;
    }
    match key {
        READ => return matches!(method, "find" | "get"),
        WRITE => return matches!(method, "create" | "update" | "patch" | "remove"),
        ALL => return true,
        _ => {}
    }
    if is_reserved(key) {
        return false;
    }
    key.chars()
        .filter_map(Method::from_shorthand)
        .any(|expanded| expanded.as_str() == method)
}

/// Rule key checked when a rule is added to a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleKey {
    /// A single verb. Custom verbs only ever match exactly.
    Method(Method),
    Read,
    Write,
    All,
    /// One or more shorthand letters, e.g. `cu` for create and update.
    Shorthand(String),
}

impl RuleKey {
    pub fn parse(key: &str) -> Result<Self, RuleKeyError> {
        if key.is_empty() {
            return Err(RuleKeyError::Empty);
        }
        match key {
            READ => return Ok(RuleKey::Read),
            WRITE => return Ok(RuleKey::Write),
            ALL => return Ok(RuleKey::All),
            _ => {}
        }
        if let Some(method) = Method::standard(key) {
            return Ok(RuleKey::Method(method));
        }
        if let Some(letter) = key.chars().find(|c| Method::from_shorthand(*c).is_none()) {
            return Err(RuleKeyError::UnmappedShorthand {
                key: key.to_string(),
                letter,
            });
        }
        Ok(RuleKey::Shorthand(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleKey::Method(method) => method.as_str(),
            RuleKey::Read => READ,
            RuleKey::Write => WRITE,
            RuleKey::All => ALL,
            RuleKey::Shorthand(code) => code,
        }
    }

    pub fn resolves(&self, method: &Method) -> bool {
        match self {
            RuleKey::Method(own) => own == method,
            RuleKey::Read => method.is_read(),
            RuleKey::Write => method.is_write(),
            RuleKey::All => true,
            RuleKey::Shorthand(code) => resolves(code, method.as_str()),
        }
    }
}

impl From<Method> for RuleKey {
    fn from(value: Method) -> Self {
        RuleKey::Method(value)
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
