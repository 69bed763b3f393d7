use crate::domain::auth::AuthContext;
use crate::error::ConfigurationError;
use crate::rpc::RpcError;
use crate::rpc::procedure::{Handler, ProcedureGroup};
use opentelemetry::{KeyValue, global, metrics::Counter};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry as MapEntry;
use std::fmt;

#[derive(Clone, Debug)]
struct Metrics {
    calls: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("portal-server");
        Self {
            calls: meter.u64_counter("portal_rpc_calls_total").with_description("Procedure calls by path and status").build(),
        }
    }
}

/// Every addressable procedure, keyed by group then procedure name.
///
/// Built once at startup and shared read-only behind an `Arc`.
pub struct RouterTree {
    groups: BTreeMap<&'static str, BTreeMap<&'static str, Box<dyn Handler>>>,
    metrics: Metrics,
}

/// Assembles procedure groups into one tree.
///
/// # Errors
/// Returns a [`ConfigurationError`] if a group name repeats or is malformed, a group
/// registers a procedure twice, or a procedure is composed under a group other than
/// the one it declares. Callers must abort startup.
pub fn compose<I>(groups: I) -> Result<RouterTree, ConfigurationError>
where
    I: IntoIterator<Item = (&'static str, ProcedureGroup)>,
{
    let mut tree: BTreeMap<&'static str, BTreeMap<&'static str, Box<dyn Handler>>> = BTreeMap::new();

    for (group_name, group) in groups {
        if group_name.is_empty() || group_name.contains('.') {
            return Err(ConfigurationError::InvalidGroupName(group_name.to_string()));
        }

        let MapEntry::Vacant(slot) = tree.entry(group_name) else {
            return Err(ConfigurationError::DuplicateGroup(group_name.to_string()));
        };

        let mut procedures = BTreeMap::new();
        for entry in group.entries {
            if entry.declared_group != group_name {
                return Err(ConfigurationError::MisplacedProcedure {
                    path: format!("{}.{}", entry.declared_group, entry.name),
                    declared: entry.declared_group.to_string(),
                    group: group_name.to_string(),
                });
            }
            if procedures.insert(entry.name, entry.handler).is_some() {
                return Err(ConfigurationError::DuplicateProcedure {
                    group: group_name.to_string(),
                    procedure: entry.name.to_string(),
                });
            }
        }

        slot.insert(procedures);
    }

    Ok(RouterTree { groups: tree, metrics: Metrics::new() })
}

impl RouterTree {
    pub fn group_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.keys().copied()
    }

    /// Every addressable `<group>.<procedure>` path in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|(group, procedures)| procedures.keys().map(move |name| format!("{group}.{name}")))
            .collect()
    }

    fn lookup(&self, path: &str) -> Option<&dyn Handler> {
        let (group, name) = path.split_once('.')?;
        self.groups.get(group)?.get(name).map(|handler| &**handler)
    }

    /// Validates `input` against the procedure's schema and runs it.
    ///
    /// # Errors
    /// `NotFound` for an unknown path, `Validation` for a mis-shaped input, or
    /// whatever the procedure itself fails with.
    #[tracing::instrument(skip(self, ctx, input), fields(rpc.path = %path), err(level = "debug"))]
    pub async fn dispatch(&self, path: &str, ctx: &AuthContext, input: Value) -> Result<Value, RpcError> {
        let Some(handler) = self.lookup(path) else {
            self.record(path, "not_found");
            return Err(RpcError::NotFound(path.to_string()));
        };

        let result = handler.invoke(ctx, input).await;
        let status = match &result {
            Ok(_) => "ok",
            Err(RpcError::Validation(_)) => "invalid_input",
            Err(RpcError::Unauthenticated(_)) => "unauthenticated",
            Err(_) => "error",
        };
        self.record(path, status);
        result
    }

    fn record(&self, path: &str, status: &'static str) {
        // Unknown paths are client-controlled; keep them out of metric labels.
        let label = if status == "not_found" { "unknown".to_string() } else { path.to_string() };
        self.metrics.calls.add(1, &[KeyValue::new("path", label), KeyValue::new("status", status)]);
    }
}

impl fmt::Debug for RouterTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterTree").field("paths", &self.paths()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::Procedure;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Procedure for Echo {
        const GROUP: &'static str = "alpha";
        const NAME: &'static str = "echo";
        type Input = String;
        type Output = String;

        async fn call(&self, _ctx: &AuthContext, input: String) -> Result<String, RpcError> {
            Ok(input)
        }
    }

    struct Whoami;

    #[async_trait]
    impl Procedure for Whoami {
        const GROUP: &'static str = "beta";
        const NAME: &'static str = "whoami";
        type Input = ();
        type Output = String;

        async fn call(&self, ctx: &AuthContext, _input: ()) -> Result<String, RpcError> {
            Ok(ctx.require_current_user_id()?.to_string())
        }
    }

    #[test]
    fn test_duplicate_group_is_rejected() {
        let err = compose([("alpha", ProcedureGroup::new().procedure(Echo)), ("alpha", ProcedureGroup::new())])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateGroup("alpha".into()));
    }

    #[test]
    fn test_distinct_groups_are_reachable() {
        let tree = compose([
            ("alpha", ProcedureGroup::new().procedure(Echo)),
            ("beta", ProcedureGroup::new().procedure(Whoami)),
        ])
        .unwrap();

        assert_eq!(tree.group_names().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert_eq!(tree.paths(), vec!["alpha.echo", "beta.whoami"]);
    }

    #[test]
    fn test_malformed_compositions() {
        assert!(matches!(compose([("", ProcedureGroup::new())]), Err(ConfigurationError::InvalidGroupName(_))));
        assert!(matches!(compose([("a.b", ProcedureGroup::new())]), Err(ConfigurationError::InvalidGroupName(_))));
        assert!(matches!(
            compose([("alpha", ProcedureGroup::new().procedure(Echo).procedure(Echo))]),
            Err(ConfigurationError::DuplicateProcedure { .. })
        ));
        assert!(matches!(
            compose([("gamma", ProcedureGroup::new().procedure(Echo))]),
            Err(ConfigurationError::MisplacedProcedure { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_validates_input() {
        let tree = compose([("alpha", ProcedureGroup::new().procedure(Echo))]).unwrap();
        let ctx = AuthContext::anonymous();

        assert_eq!(tree.dispatch("alpha.echo", &ctx, json!("hi")).await.unwrap(), json!("hi"));

        let err = tree.dispatch("alpha.echo", &ctx, json!(42)).await.unwrap_err();
        assert!(matches!(err, RpcError::Validation(_)));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_path() {
        let tree = compose([("alpha", ProcedureGroup::new().procedure(Echo))]).unwrap();
        let ctx = AuthContext::anonymous();

        for path in ["alpha.nope", "nope.echo", "alphaecho", ""] {
            assert!(matches!(tree.dispatch(path, &ctx, Value::Null).await, Err(RpcError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_dispatch_passes_auth_context() {
        let tree = compose([("beta", ProcedureGroup::new().procedure(Whoami))]).unwrap();

        let err = tree.dispatch("beta.whoami", &AuthContext::anonymous(), Value::Null).await.unwrap_err();
        assert!(matches!(err, RpcError::Unauthenticated(_)));
    }
}
