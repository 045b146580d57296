use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Verb of a data-service call.
///
/// Identity is the verb string: `Method::Custom("find".into())` equals
/// `Method::Find`. Build custom verbs through [`Method::from`] to get the
/// canonical variant.
#[derive(Clone, Debug)]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Custom(String),
}

impl Method {
    pub const STANDARD: [Method; 6] = [
        Method::Find,
        Method::Get,
        Method::Create,
        Method::Update,
        Method::Patch,
        Method::Remove,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Method::Find => "find",
            Method::Get => "get",
            Method::Create => "create",
            Method::Update => "update",
            Method::Patch => "patch",
            Method::Remove => "remove",
            Method::Custom(name) => name,
        }
    }

    /// Standard verb for a name, if any.
    pub fn standard(name: &str) -> Option<Self> {
        match name {
            "find" => Some(Method::Find),
            "get" => Some(Method::Get),
            "create" => Some(Method::Create),
            "update" => Some(Method::Update),
            "patch" => Some(Method::Patch),
            "remove" => Some(Method::Remove),
            _ => None,
        }
    }

    /// Verb denoted by one letter of a shorthand rule key.
    pub fn from_shorthand(letter: char) -> Option<Self> {
        match letter {
            'c' => Some(Method::Create),
            'f' => Some(Method::Find),
            'g' => Some(Method::Get),
            'p' => Some(Method::Patch),
            'r' => Some(Method::Remove),
            'u' => Some(Method::Update),
            _ => None,
        }
    }

    pub fn is_standard(&self) -> bool {
        Self::standard(self.as_str()).is_some()
    }

    pub fn is_read(&self) -> bool {
        matches!(self.as_str(), "find" | "get")
    }

    pub fn is_write(&self) -> bool {
        matches!(self.as_str(), "create" | "update" | "patch" | "remove")
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        Self::standard(value).unwrap_or_else(|| Method::Custom(value.to_string()))
    }
}

impl From<String> for Method {
    fn from(value: String) -> Self {
        Self::standard(&value).unwrap_or(Method::Custom(value))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Method::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_spelling_of_standard_verb_is_the_same_verb() {
        assert_eq!(Method::Custom("find".into()), Method::Find);
        assert_eq!(Method::from("patch"), Method::Patch);
        assert!(matches!(Method::from("publish"), Method::Custom(_)));
    }

    #[test]
    fn groups_cover_all_standard_verbs_once() {
        let reads = Method::STANDARD.iter().filter(|m| m.is_read()).count();
        let writes = Method::STANDARD.iter().filter(|m| m.is_write()).count();
        assert_eq!((reads, writes), (2, 4));
        assert!(!Method::from("publish").is_read());
        assert!(!Method::from("publish").is_write());
    }

    #[test]
    fn shorthand_alphabet() {
        let expanded: Vec<_> = "cfgpru"
            .chars()
            .filter_map(Method::from_shorthand)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(
            expanded,
            ["create", "find", "get", "patch", "remove", "update"]
        );
        assert!(Method::from_shorthand('x').is_none());
    }
}
