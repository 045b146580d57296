//! Rule-based authorization for data-service verbs.
//!
//! Integrators attach [`allow`] hooks holding rule tables to their services.
//! The [`protect_services`] plugin appends an enforcement step to every verb
//! of every service and keeps it last, so an external call only reaches its
//! handler once some rule granted it. Calls without a provider come from
//! inside the process and are never checked.

pub mod config;
pub mod context;
pub mod enforce;
pub mod error;
pub mod evaluator;
pub mod hooks;
pub mod method;
pub mod protect;
pub mod realm;
pub mod redact;
pub mod resolver;
pub mod rules;
pub mod service;

pub use config::{CheckOptions, ProtectOptions, DEFAULT_PROTECT_WORD};
pub use context::{CallContext, Id, Params};
pub use enforce::{AllowedChecker, EnforcementHook, Enforcer};
pub use error::{AuthzError, ConfigError, RuleKeyError};
pub use evaluator::{allow, evaluate, AllowHook};
pub use hooks::{BeforeHooks, ChainObserver, Hook, HookChain};
pub use method::Method;
pub use protect::{protect_services, ProtectServices, ServiceGuard};
pub use realm::Realm;
pub use resolver::{resolves, RuleKey};
pub use rules::{ErrorInfo, IntoRuleResult, Rule, RuleError, RuleResult, RuleTable};
pub use service::{Mixin, Service, ServiceHandle, ServiceRegistry};
