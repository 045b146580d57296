//! Before-chains of service verbs.
//!
//! Every verb runs the `all` hooks, then its own hooks, in registration
//! order. Observers are told whenever integrators register more hooks, which
//! is how the enforcement step keeps its place at the end.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;

use crate::{context::CallContext, error::AuthzError, method::Method};

/// One step of a before-chain. Returning an error aborts the call.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &mut CallContext) -> Result<(), AuthzError>;
}

/// Notified after integrators change a chain.
pub trait ChainObserver: Send + Sync {
    fn chain_changed(&self, chain: &mut HookChain);
}

/// Hooks to add to a service, grouped like `before: { all, find, ... }`.
#[derive(Clone, Default)]
pub struct BeforeHooks {
    all: Vec<Arc<dyn Hook>>,
    methods: Vec<(Method, Vec<Arc<dyn Hook>>)>,
}

impl BeforeHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for every verb of the service.
    pub fn all(mut self, hook: impl Hook + 'static) -> Self {
        self.all.push(Arc::new(hook));
        self
    }

    pub fn method(mut self, method: impl Into<Method>, hook: impl Hook + 'static) -> Self {
        self.push(method.into(), Arc::new(hook));
        self
    }

    /// Same hook for several verbs.
    pub fn methods<I, M>(mut self, methods: I, hook: impl Hook + 'static) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Method>,
    {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        for method in methods {
            self.push(method.into(), hook.clone());
        }
        self
    }

    fn push(&mut self, method: Method, hook: Arc<dyn Hook>) {
        match self.methods.iter_mut().find(|(own, _)| *own == method) {
            Some((_, hooks)) => hooks.push(hook),
            None => self.methods.push((method, vec![hook])),
        }
    }
}

#[derive(Clone, Default)]
pub struct HookChain {
    all: Vec<Arc<dyn Hook>>,
    methods: HashMap<Method, Vec<Arc<dyn Hook>>>,
    observers: Vec<Arc<dyn ChainObserver>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends integrator hooks, then notifies observers.
    pub fn register(&mut self, hooks: BeforeHooks) {
        self.all.extend(hooks.all);
        for (method, added) in hooks.methods {
            self.methods.entry(method).or_default().extend(added);
        }
        self.notify();
    }

    /// Subscribes `observer` and lets it see the current chain right away.
    pub fn observe(&mut self, observer: Arc<dyn ChainObserver>) {
        observer.chain_changed(self);
        self.observers.push(observer);
    }

    /// Appends one hook without notifying observers.
    pub fn push(&mut self, method: Method, hook: Arc<dyn Hook>) {
        self.methods.entry(method).or_default().push(hook);
    }

    /// Removes every occurrence of `hook`, compared by identity.
    pub fn remove(&mut self, hook: &Arc<dyn Hook>) {
        self.all.retain(|own| !Arc::ptr_eq(own, hook));
        for hooks in self.methods.values_mut() {
            hooks.retain(|own| !Arc::ptr_eq(own, hook));
        }
    }

    /// Steps run before the handler of `method`, in order.
    pub fn steps<'a>(
        &'a self,
        method: &'a Method,
    ) -> impl Iterator<Item = &'a Arc<dyn Hook>> + 'a {
        self.all
            .iter()
            .chain(self.methods.get(method).into_iter().flatten())
    }

    pub fn count(&self, method: &Method, hook: &Arc<dyn Hook>) -> usize {
        self.steps(method)
            .filter(|own| Arc::ptr_eq(*own, hook))
            .count()
    }

    fn notify(&mut self) {
        let observers = self.observers.clone();
        for observer in observers {
            observer.chain_changed(self);
        }
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self
            .methods
            .iter()
            .map(|(method, hooks)| (method.as_str(), hooks.len()))
            .collect();
        methods.sort_unstable();
        f.debug_struct("HookChain")
            .field("all", &self.all.len())
            .field("methods", &methods)
            .field("observers", &self.observers.len())
            .finish()
    }
}
