use std::sync::Arc;

use anyhow::Result;
use authz_tests::{CountingEnforcer, MockService};
use platform_authz::{
    AuthzError, BeforeHooks, CallContext, Method, Params, ProtectOptions, ProtectServices,
    RuleTable, ServiceRegistry, allow, protect_services,
};
use serde_json::json;

fn external() -> Params {
    Params::external("rest")
}

#[tokio::test]
async fn enforcement_runs_before_each_service_call() -> Result<()> {
    let enforcer = CountingEnforcer::permissive();
    let mut app = ServiceRegistry::new();
    app.mixin(Arc::new(
        ProtectServices::new(ProtectOptions::default()).with_enforcer(enforcer.clone()),
    ))
    .register("/test", MockService::new());

    app.service("test")?.find(Params::internal()).await?;
    assert_eq!(enforcer.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn unauthorized_external_calls_are_forbidden() -> Result<()> {
    let mut app = ServiceRegistry::new();
    app.configure(protect_services(ProtectOptions::default()))
        .register("/test", MockService::new());

    let err = app.service("test")?.find(external()).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)));
    assert_eq!(err.status(), 403);
    Ok(())
}

#[tokio::test]
async fn rules_grant_access() -> Result<()> {
    let mut app = ServiceRegistry::new();
    app.configure(protect_services(ProtectOptions::default()))
        .register("/test", MockService::new());
    let rules = RuleTable::new().rule("find", |ctx: &CallContext| {
        ctx.query("testQuery") == Some(&json!("yes"))
    })?;
    app.hooks("test", BeforeHooks::new().method(Method::Find, allow(rules)))?;
    let service = app.service("test")?;

    assert!(service.find(external()).await.unwrap_err().is_forbidden());
    let with_query = external().with_query(json!({ "testQuery": "yes" }));
    assert_eq!(service.find(with_query).await?, "test-find");
    Ok(())
}

#[tokio::test]
async fn services_registered_before_configuration_are_protected() -> Result<()> {
    let mut app = ServiceRegistry::new();
    app.register("/test", MockService::new());
    let rules = RuleTable::new().rule("find", |ctx: &CallContext| {
        ctx.query("test") == Some(&json!(true))
    })?;
    app.hooks("test", BeforeHooks::new().all(allow(rules)))?;
    app.configure(protect_services(ProtectOptions::default()));
    let service = app.service("test")?;

    assert_eq!(service.find(Params::internal()).await?, "test-find");
    assert!(service.find(external()).await.unwrap_err().is_forbidden());
    Ok(())
}

#[tokio::test]
async fn omitted_services_are_left_alone() -> Result<()> {
    let enforcer = CountingEnforcer::checking();
    let options = ProtectOptions {
        omit_services: vec!["authentication".into(), "/health/".into()],
        ..ProtectOptions::default()
    };
    let mut app = ServiceRegistry::new();
    app.mixin(Arc::new(
        ProtectServices::new(options).with_enforcer(enforcer.clone()),
    ))
    .register("authentication", MockService::new())
    .register("health", MockService::new())
    .register("users", MockService::new());

    assert_eq!(
        app.service("authentication")?
            .create(json!({ "password": "x" }), external())
            .await?,
        "test-create"
    );
    assert_eq!(app.service("health")?.find(external()).await?, "test-find");
    assert_eq!(enforcer.calls(), 0);

    assert!(app.service("users")?.find(external()).await.is_err());
    assert_eq!(enforcer.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn custom_verbs_are_protected_too() -> Result<()> {
    let mut app = ServiceRegistry::new();
    app.configure(protect_services(ProtectOptions::default()))
        .register("jobs", MockService::new().with_custom("publish"));
    let service = app.service("jobs")?;

    let err = service
        .call("publish", None, None, external())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request is not allowed for service: MockService method: publish"
    );

    let rules = RuleTable::new().method("publish", |_: &CallContext| true);
    app.hooks("jobs", BeforeHooks::new().all(allow(rules)))?;
    let published = app
        .service("jobs")?
        .call("publish", None, None, external())
        .await?;
    assert_eq!(published, "test-publish");
    Ok(())
}

#[tokio::test]
async fn options_from_env_style_lookup_apply() -> Result<()> {
    let options = ProtectOptions::from_lookup(|key| match key {
        "AUTHZ_PROTECTED_FIELDS" => Some("token".into()),
        "AUTHZ_PROTECT_WORD" => Some("***".into()),
        _ => None,
    })?;
    let mut app = ServiceRegistry::new();
    app.configure(protect_services(options))
        .register("sessions", MockService::new());

    let err = app
        .service("sessions")?
        .create(json!({ "token": "abc", "password": "pw" }), external())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Request is not allowed for service: MockService method: create data: {"token":"***","password":"pw"}"#
    );
    Ok(())
}
