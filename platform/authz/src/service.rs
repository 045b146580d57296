//! Registry of data services and verb dispatch through their before-chains.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::{
    config::normalize_path,
    context::{CallContext, Id, Params},
    error::AuthzError,
    hooks::{BeforeHooks, HookChain},
    method::Method,
};

/// A data service answering the verbs it lists in [`Service::methods`].
#[async_trait]
pub trait Service: Send + Sync {
    /// Name used in diagnostics and denial messages.
    fn name(&self) -> &str;

    fn methods(&self) -> Vec<Method> {
        Method::STANDARD.to_vec()
    }

    async fn handle(&self, ctx: &CallContext) -> anyhow::Result<Value>;
}

/// Extension applied to every service of a registry.
pub trait Mixin: Send + Sync {
    fn on_register(&self, path: &str, service: &dyn Service, chain: &mut HookChain);
}

struct Entry {
    service: Arc<dyn Service>,
    chain: HookChain,
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Entry>,
    mixins: Vec<Arc<dyn Mixin>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `service` at `path`, replacing any service already there.
    pub fn register(&mut self, path: &str, service: impl Service + 'static) -> &mut Self {
        let path = normalize_path(path).to_string();
        let service: Arc<dyn Service> = Arc::new(service);
        let mut chain = HookChain::new();
        for mixin in &self.mixins {
            mixin.on_register(&path, service.as_ref(), &mut chain);
        }
        self.services.insert(path, Entry { service, chain });
        self
    }

    /// Runs a plugin against the registry.
    pub fn configure(&mut self, plugin: impl FnOnce(&mut Self)) -> &mut Self {
        plugin(self);
        self
    }

    /// Applies `mixin` to the services already mounted and to every later one.
    pub fn mixin(&mut self, mixin: Arc<dyn Mixin>) -> &mut Self {
        for (path, entry) in self.services.iter_mut() {
            mixin.on_register(path, entry.service.as_ref(), &mut entry.chain);
        }
        self.mixins.push(mixin);
        self
    }

    /// Adds before-hooks to the service at `path`.
    pub fn hooks(&mut self, path: &str, hooks: BeforeHooks) -> Result<&mut Self, AuthzError> {
        let entry = self
            .services
            .get_mut(normalize_path(path))
            .ok_or_else(|| AuthzError::UnknownService(path.to_string()))?;
        entry.chain.register(hooks);
        Ok(self)
    }

    pub fn service(&self, path: &str) -> Result<ServiceHandle<'_>, AuthzError> {
        let (path, entry) = self
            .services
            .get_key_value(normalize_path(path))
            .ok_or_else(|| AuthzError::UnknownService(path.to_string()))?;
        Ok(ServiceHandle { path, entry })
    }

    pub fn chain(&self, path: &str) -> Option<&HookChain> {
        self.services
            .get(normalize_path(path))
            .map(|entry| &entry.chain)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// Caller-side view of one mounted service.
pub struct ServiceHandle<'a> {
    path: &'a str,
    entry: &'a Entry,
}

impl ServiceHandle<'_> {
    pub fn path(&self) -> &str {
        self.path
    }

    pub fn name(&self) -> &str {
        self.entry.service.name()
    }

    pub async fn find(&self, params: Params) -> Result<Value, AuthzError> {
        self.dispatch(CallContext::new(Method::Find, params)).await
    }

    pub async fn get(&self, id: impl Into<Id>, params: Params) -> Result<Value, AuthzError> {
        self.dispatch(CallContext::new(Method::Get, params).with_id(id))
            .await
    }

    pub async fn create(&self, data: Value, params: Params) -> Result<Value, AuthzError> {
        self.dispatch(CallContext::new(Method::Create, params).with_data(data))
            .await
    }

    pub async fn update(
        &self,
        id: impl Into<Id>,
        data: Value,
        params: Params,
    ) -> Result<Value, AuthzError> {
        let ctx = CallContext::new(Method::Update, params)
            .with_id(id)
            .with_data(data);
        self.dispatch(ctx).await
    }

    /// `id` of `None` patches every record matching the query.
    pub async fn patch(
        &self,
        id: Option<Id>,
        data: Value,
        params: Params,
    ) -> Result<Value, AuthzError> {
        let mut ctx = CallContext::new(Method::Patch, params).with_data(data);
        ctx.id = id;
        self.dispatch(ctx).await
    }

    pub async fn remove(&self, id: Option<Id>, params: Params) -> Result<Value, AuthzError> {
        let mut ctx = CallContext::new(Method::Remove, params);
        ctx.id = id;
        self.dispatch(ctx).await
    }

    /// Invokes any verb, custom ones included.
    pub async fn call(
        &self,
        method: impl Into<Method>,
        id: Option<Id>,
        data: Option<Value>,
        params: Params,
    ) -> Result<Value, AuthzError> {
        let mut ctx = CallContext::new(method, params);
        ctx.id = id;
        ctx.data = data;
        self.dispatch(ctx).await
    }

    async fn dispatch(&self, ctx: CallContext) -> Result<Value, AuthzError> {
        let service = &self.entry.service;
        let mut ctx = ctx.with_service(service.name(), self.path);
        if !service.methods().contains(&ctx.method) {
            return Err(AuthzError::MethodNotAllowed {
                service: self.path.to_string(),
                method: ctx.method.to_string(),
            });
        }

        let span = info_span!(
            "authz.dispatch",
            service = %self.path,
            method = %ctx.method,
            external = ctx.is_external()
        );
        async move {
            let method = ctx.method.clone();
            for hook in self.entry.chain.steps(&method) {
                hook.run(&mut ctx).await?;
            }
            service.handle(&ctx).await.map_err(AuthzError::Fault)
        }
        .instrument(span)
        .await
    }
}
