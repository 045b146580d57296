//! Per-call authorization state.
//!
//! Written by rule evaluation, read by the enforcement check. Stored in a
//! private field of [`Params`], created on first write.

use crate::{context::Params, rules::ErrorInfo};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Realm {
    allowed: bool,
    errors: Vec<Vec<ErrorInfo>>,
}

impl Realm {
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Rejection batches in evaluation order.
    pub fn errors(&self) -> &[Vec<ErrorInfo>] {
        &self.errors
    }
}

pub fn is_allowed(params: &Params) -> bool {
    params.realm.as_ref().is_some_and(Realm::allowed)
}

pub fn errors(params: &Params) -> &[Vec<ErrorInfo>] {
    params.realm.as_ref().map(Realm::errors).unwrap_or_default()
}

/// Marks the call as authorized. There is no way back to denied.
pub fn set_allowed(params: &mut Params) {
    init(params).allowed = true;
}

pub fn add_errors(params: &mut Params, batch: Vec<ErrorInfo>) {
    init(params).errors.push(batch);
}

fn init(params: &mut Params) -> &mut Realm {
    params.realm.get_or_insert_with(Realm::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_realm_reads_as_denied_without_errors() {
        let params = Params::external("rest");
        assert!(!is_allowed(&params));
        assert!(errors(&params).is_empty());
        assert!(params.realm().is_none());
    }

    #[test]
    fn writes_create_the_realm_lazily() {
        let mut params = Params::external("rest");
        add_errors(&mut params, vec![ErrorInfo::new("first")]);
        add_errors(&mut params, vec![ErrorInfo::new("second")]);
        assert_eq!(errors(&params).len(), 2);
        assert_eq!(errors(&params)[0][0].message, "first");
        assert!(!is_allowed(&params));

        set_allowed(&mut params);
        set_allowed(&mut params);
        assert!(is_allowed(&params));
        assert_eq!(errors(&params).len(), 2);
    }

    #[test]
    fn caller_supplied_fields_cannot_forge_access() {
        let params: Params = serde_json::from_value(json!({
            "provider": "rest",
            "allowed": true,
            "realm": { "allowed": true },
        }))
        .unwrap();
        assert!(!is_allowed(&params));
        assert!(params.realm().is_none());
    }

    #[test]
    fn realm_does_not_serialize() {
        let mut params = Params::external("rest");
        set_allowed(&mut params);
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({ "provider": "rest" }));
    }
}
