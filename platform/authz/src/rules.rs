//! Rule predicates and rule tables.

use std::{fmt, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    context::CallContext,
    error::RuleKeyError,
    method::Method,
    resolver::RuleKey,
};

/// One reason a rule rejected the caller's input.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            field: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Failure of a rule predicate.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule rejects the input. Evaluation continues with the next rule.
    #[error("rule rejected input with {} error(s)", .0.len())]
    Invalid(Vec<ErrorInfo>),
    /// Anything else. Aborts evaluation and reaches the caller as is.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl RuleError {
    pub fn invalid(errors: impl IntoIterator<Item = ErrorInfo>) -> Self {
        RuleError::Invalid(errors.into_iter().collect())
    }
}

pub type RuleResult = Result<bool, RuleError>;

/// Decides whether a call may proceed.
#[async_trait]
pub trait Rule: Send + Sync {
    async fn check(&self, ctx: &CallContext) -> RuleResult;
}

/// Return types accepted from synchronous rule closures.
pub trait IntoRuleResult {
    fn into_rule_result(self) -> RuleResult;
}

impl IntoRuleResult for bool {
    fn into_rule_result(self) -> RuleResult {
        Ok(self)
    }
}

impl IntoRuleResult for RuleResult {
    fn into_rule_result(self) -> RuleResult {
        self
    }
}

struct FnRule<F, R> {
    f: F,
    _result: PhantomData<fn() -> R>,
}

#[async_trait]
impl<F, R> Rule for FnRule<F, R>
where
    F: Fn(&CallContext) -> R + Send + Sync,
    R: IntoRuleResult,
{
    async fn check(&self, ctx: &CallContext) -> RuleResult {
        (self.f)(ctx).into_rule_result()
    }
}

struct AsyncFnRule<F>(F);

#[async_trait]
impl<F> Rule for AsyncFnRule<F>
where
    F: for<'a> Fn(&'a CallContext) -> BoxFuture<'a, RuleResult> + Send + Sync,
{
    async fn check(&self, ctx: &CallContext) -> RuleResult {
        (self.0)(ctx).await
    }
}

#[derive(Clone)]
struct RuleEntry {
    key: RuleKey,
    rule: Arc<dyn Rule>,
}

/// Ordered mapping from rule key to predicate. Insertion order is the
/// evaluation order.
///
/// Inside a predicate, `?` only converts `anyhow::Error` into a fault; wrap
/// other errors first, e.g. with `anyhow::Context`:
///
/// ```ignore
/// let rules = RuleTable::new()
///     .rule("find", |ctx: &CallContext| ctx.query("public") == Some(&json!(true)))?
///     .rule("write", |ctx: &CallContext| -> RuleResult {
///         let owner = owner_of(ctx).context("owner lookup failed")?;
///         Ok(owner == caller_of(ctx))
///     })?;
/// ```
#[derive(Clone, Default)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a synchronous rule under a string key (`find`, `read`, `cu`, ...).
    pub fn rule<F, R>(self, key: &str, f: F) -> Result<Self, RuleKeyError>
    where
        F: Fn(&CallContext) -> R + Send + Sync + 'static,
        R: IntoRuleResult + 'static,
    {
        let key = RuleKey::parse(key)?;
        Ok(self.with_rule(
            key,
            Arc::new(FnRule {
                f,
                _result: PhantomData,
            }),
        ))
    }

    /// Adds a rule whose check suspends, e.g. on a remote lookup.
    pub fn rule_async<F>(self, key: &str, f: F) -> Result<Self, RuleKeyError>
    where
        F: for<'a> Fn(&'a CallContext) -> BoxFuture<'a, RuleResult> + Send + Sync + 'static,
    {
        let key = RuleKey::parse(key)?;
        Ok(self.with_rule(key, Arc::new(AsyncFnRule(f))))
    }

    /// Adds a synchronous rule for exactly one verb, custom verbs included.
    pub fn method<F, R>(self, method: impl Into<Method>, f: F) -> Self
    where
        F: Fn(&CallContext) -> R + Send + Sync + 'static,
        R: IntoRuleResult + 'static,
    {
        self.with_rule(
            RuleKey::Method(method.into()),
            Arc::new(FnRule {
                f,
                _result: PhantomData,
            }),
        )
    }

    /// Adds a rule under an already checked key. An entry with the same key
    /// string keeps its position and takes both the new key and the new rule.
    pub fn with_rule(mut self, key: RuleKey, rule: Arc<dyn Rule>) -> Self {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.key.as_str() == key.as_str())
        {
            Some(entry) => *entry = RuleEntry { key, rule },
            None => self.entries.push(RuleEntry { key, rule }),
        }
        self
    }

    /// Rules applying to `method`, in table order.
    pub fn matching<'a>(
        &'a self,
        method: &'a Method,
    ) -> impl Iterator<Item = &'a Arc<dyn Rule>> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.key.resolves(method))
            .map(|entry| &entry.rule)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RuleKey> {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys().map(RuleKey::as_str)).finish()
    }
}
