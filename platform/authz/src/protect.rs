//! Registry plugin putting every service behind the enforcement check.

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::ProtectOptions,
    enforce::{AllowedChecker, EnforcementHook, Enforcer},
    hooks::{ChainObserver, Hook, HookChain},
    method::Method,
    service::{Mixin, Service, ServiceRegistry},
};

/// Keeps one terminal hook as the last step of each verb of a service.
///
/// Runs when installed and again whenever integrators register hooks on the
/// chain: the terminal hook is taken out by identity and appended anew.
pub struct ServiceGuard {
    path: String,
    methods: Vec<Method>,
    terminal: Arc<dyn Hook>,
}

impl ServiceGuard {
    pub fn new(path: impl Into<String>, methods: Vec<Method>, terminal: Arc<dyn Hook>) -> Self {
        Self {
            path: path.into(),
            methods,
            terminal,
        }
    }
}

impl ChainObserver for ServiceGuard {
    fn chain_changed(&self, chain: &mut HookChain) {
        chain.remove(&self.terminal);
        for method in &self.methods {
            chain.push(method.clone(), self.terminal.clone());
        }
        debug!(service = %self.path, methods = self.methods.len(), "enforcement step placed last");
    }
}

/// Mixin guarding each non-omitted service with an [`EnforcementHook`].
#[derive(Clone)]
pub struct ProtectServices {
    options: ProtectOptions,
    enforcer: Arc<dyn Enforcer>,
}

impl ProtectServices {
    pub fn new(options: ProtectOptions) -> Self {
        let enforcer = Arc::new(AllowedChecker::new(options.check.clone()));
        Self { options, enforcer }
    }

    /// Swaps the default [`AllowedChecker`] for another enforcer.
    pub fn with_enforcer(mut self, enforcer: Arc<dyn Enforcer>) -> Self {
        self.enforcer = enforcer;
        self
    }

    pub fn options(&self) -> &ProtectOptions {
        &self.options
    }
}

impl Mixin for ProtectServices {
    fn on_register(&self, path: &str, service: &dyn Service, chain: &mut HookChain) {
        if self.options.is_omitted(path) {
            debug!(service = %path, "service left unprotected");
            return;
        }
        let terminal: Arc<dyn Hook> = Arc::new(EnforcementHook::new(self.enforcer.clone()));
        chain.observe(Arc::new(ServiceGuard::new(path, service.methods(), terminal)));
    }
}

/// Plugin for [`ServiceRegistry::configure`].
///
/// ```ignore
/// registry.configure(protect_services(ProtectOptions::from_env()?));
/// ```
pub fn protect_services(options: ProtectOptions) -> impl FnOnce(&mut ServiceRegistry) {
    move |registry| {
        registry.mixin(Arc::new(ProtectServices::new(options)));
    }
}
