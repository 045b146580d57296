//! Terminal authorization gate of every protected verb.

use std::{fmt::Write as _, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::{
    config::CheckOptions, context::CallContext, error::AuthzError, hooks::Hook, realm,
    redact::{is_truthy, redact},
};

/// Decides the fate of a call once all rule hooks have run.
pub trait Enforcer: Send + Sync {
    fn enforce(&self, ctx: &CallContext) -> Result<(), AuthzError>;
}

/// Default enforcer.
///
/// Lets internal and authorized calls through. Otherwise reports the first
/// validation batch recorded by the rules, or denies with a message naming
/// the service, verb, id, redacted payload and query of the call.
#[derive(Clone, Debug, Default)]
pub struct AllowedChecker {
    options: CheckOptions,
}

impl AllowedChecker {
    pub fn new(options: CheckOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn check(&self, ctx: &CallContext) -> Result<(), AuthzError> {
        if !ctx.is_external() || realm::is_allowed(&ctx.params) {
            return Ok(());
        }
        if let Some(first) = realm::errors(&ctx.params).first() {
            warn!(
                service = %ctx.service,
                method = %ctx.method,
                errors = first.len(),
                "request rejected by rule validation"
            );
            return Err(AuthzError::BadRequest(first.clone()));
        }
        warn!(service = %ctx.service, method = %ctx.method, "request not allowed");
        Err(AuthzError::Forbidden(self.denial_message(ctx)))
    }

    fn denial_message(&self, ctx: &CallContext) -> String {
        let mut message = String::from("Request is not allowed for");
        if !ctx.service.is_empty() {
            let _ = write!(message, " service: {}", ctx.service);
        }
        let _ = write!(message, " method: {}", ctx.method);
        if let Some(id) = ctx.id.as_ref().filter(|id| !id.is_blank()) {
            let _ = write!(message, " id: {id}");
        }
        if let Some(data) = ctx.data.as_ref().filter(|data| is_truthy(data)) {
            let redacted = redact(
                data,
                &self.options.protected_fields,
                &self.options.protect_word,
            );
            let _ = write!(message, " data: {}", compact(&redacted));
        }
        if !ctx.params.query.is_empty() {
            let query = Value::Object(ctx.params.query.clone());
            let _ = write!(message, " query: {}", compact(&query));
        }
        message
    }
}

impl Enforcer for AllowedChecker {
    fn enforce(&self, ctx: &CallContext) -> Result<(), AuthzError> {
        self.check(ctx)
    }
}

fn compact(value: &Value) -> String {
    // Display of serde_json::Value is compact JSON.
    value.to_string()
}

/// Hook running an [`Enforcer`]. Never changes the call context.
#[derive(Clone)]
pub struct EnforcementHook {
    enforcer: Arc<dyn Enforcer>,
}

impl EnforcementHook {
    pub fn new(enforcer: Arc<dyn Enforcer>) -> Self {
        Self { enforcer }
    }
}

#[async_trait]
impl Hook for EnforcementHook {
    async fn run(&self, ctx: &mut CallContext) -> Result<(), AuthzError> {
        self.enforcer.enforce(ctx)
    }
}
