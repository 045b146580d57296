use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_PROTECT_WORD: &str = "[HIDDEN]";

/// How denial messages hide sensitive payload fields.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Dot paths into the payload, e.g. `user.details.password`.
    pub protected_fields: Vec<String>,
    pub protect_word: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            protected_fields: ["password", "newPassword", "oldPassword"]
                .map(String::from)
                .to_vec(),
            protect_word: DEFAULT_PROTECT_WORD.to_string(),
        }
    }
}

impl CheckOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protect_word.is_empty() {
            return Err(ConfigError::EmptyProtectWord);
        }
        if let Some(path) = self
            .protected_fields
            .iter()
            .find(|path| path.split('.').any(str::is_empty))
        {
            return Err(ConfigError::InvalidFieldPath(path.clone()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtectOptions {
    /// Service paths left unprotected.
    pub omit_services: Vec<String>,
    #[serde(flatten)]
    pub check: CheckOptions,
}

impl Default for ProtectOptions {
    fn default() -> Self {
        Self {
            omit_services: vec!["authentication".to_string()],
            check: CheckOptions::default(),
        }
    }
}

impl ProtectOptions {
    /// Defaults overridden by `AUTHZ_OMIT_SERVICES`, `AUTHZ_PROTECTED_FIELDS`
    /// (comma separated) and `AUTHZ_PROTECT_WORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(raw) = lookup("AUTHZ_OMIT_SERVICES") {
            options.omit_services = split_list(&raw)
                .into_iter()
                .map(|path| normalize_path(&path).to_string())
                .collect();
        }
        if let Some(raw) = lookup("AUTHZ_PROTECTED_FIELDS") {
            options.check.protected_fields = split_list(&raw);
        }
        if let Some(word) = lookup("AUTHZ_PROTECT_WORD") {
            options.check.protect_word = word;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check.validate()
    }

    pub fn is_omitted(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.omit_services
            .iter()
            .any(|omitted| normalize_path(omitted) == path)
    }
}

/// Service path without leading or trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|item| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
