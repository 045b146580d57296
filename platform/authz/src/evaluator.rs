use async_trait::async_trait;
use tracing::debug;

use crate::{
    context::CallContext,
    error::AuthzError,
    hooks::Hook,
    realm,
    rules::{RuleError, RuleTable},
};

/// Runs the rules of `table` that apply to `ctx.method`, in table order.
///
/// The first rule returning `true` authorizes the call and ends evaluation.
/// A rule rejecting with [`RuleError::Invalid`] records its batch and lets
/// the next rule run. Any other rule error aborts and is returned as is.
/// Internal calls and calls already authorized are left alone.
pub async fn evaluate(ctx: &mut CallContext, table: &RuleTable) -> Result<(), AuthzError> {
    if !ctx.is_external() {
        debug!(method = %ctx.method, "internal call, rules skipped");
        return Ok(());
    }
    if realm::is_allowed(&ctx.params) {
        return Ok(());
    }

    for rule in table.matching(&ctx.method) {
        match rule.check(ctx).await {
            Ok(true) => {
                debug!(service = %ctx.service, method = %ctx.method, "rule granted access");
                realm::set_allowed(&mut ctx.params);
                return Ok(());
            }
            Ok(false) => {}
            Err(RuleError::Invalid(batch)) => {
                debug!(
                    service = %ctx.service,
                    method = %ctx.method,
                    errors = batch.len(),
                    "rule rejected input"
                );
                realm::add_errors(&mut ctx.params, batch);
            }
            Err(RuleError::Fault(err)) => return Err(AuthzError::Fault(err)),
        }
    }
    Ok(())
}

/// Hook evaluating one rule table. Attach it anywhere in a before-chain.
#[derive(Clone, Debug)]
pub struct AllowHook {
    rules: RuleTable,
}

impl AllowHook {
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}

#[async_trait]
impl Hook for AllowHook {
    async fn run(&self, ctx: &mut CallContext) -> Result<(), AuthzError> {
        evaluate(ctx, &self.rules).await
    }
}

pub fn allow(rules: RuleTable) -> AllowHook {
    AllowHook { rules }
}
