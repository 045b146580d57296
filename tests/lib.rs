//! Shared fixtures for the authorization integration tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use platform_authz::{
    AllowedChecker, AuthzError, CallContext, Enforcer, Hook, Method, Params, RuleTable, allow,
};
use serde_json::{Value, json};

/// Answers every verb with `test-<verb>`.
#[derive(Clone, Debug, Default)]
pub struct MockService {
    custom: Vec<Method>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also serve `method`, e.g. `publish`.
    pub fn with_custom(mut self, method: impl Into<Method>) -> Self {
        self.custom.push(method.into());
        self
    }
}

#[async_trait]
impl platform_authz::Service for MockService {
    fn name(&self) -> &str {
        "MockService"
    }

    fn methods(&self) -> Vec<Method> {
        Method::STANDARD
            .into_iter()
            .chain(self.custom.iter().cloned())
            .collect()
    }

    async fn handle(&self, ctx: &CallContext) -> anyhow::Result<Value> {
        Ok(json!(format!("test-{}", ctx.method)))
    }
}

/// Enforcer counting its invocations. Delegates to the default checker
/// unless built with [`CountingEnforcer::permissive`].
#[derive(Debug, Default)]
pub struct CountingEnforcer {
    calls: AtomicUsize,
    delegate: Option<AllowedChecker>,
}

impl CountingEnforcer {
    pub fn permissive() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn checking() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delegate: Some(AllowedChecker::default()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Enforcer for CountingEnforcer {
    fn enforce(&self, ctx: &CallContext) -> Result<(), AuthzError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.delegate {
            Some(checker) => checker.check(ctx),
            None => Ok(()),
        }
    }
}

/// Runs one allow hook against a hand-built call context.
#[derive(Clone, Debug)]
pub struct AllowHookRequestSimulator {
    context: CallContext,
    rules: RuleTable,
}

impl AllowHookRequestSimulator {
    pub fn new(method: impl Into<Method>, params: Params, rules: RuleTable) -> Self {
        Self {
            context: CallContext::new(method, params),
            rules,
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.context.params = params;
        self
    }

    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    /// Context after the hook ran, or the error it raised.
    pub async fn run(&self) -> Result<CallContext, AuthzError> {
        let mut context = self.context.clone();
        allow(self.rules.clone()).run(&mut context).await?;
        Ok(context)
    }
}
