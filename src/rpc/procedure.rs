use crate::domain::auth::AuthContext;
use crate::rpc::RpcError;
use crate::schemas::Schema;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A remotely callable operation, addressed as `GROUP.NAME`.
///
/// The same type is the contract for both sides: the server validates `Input`
/// with its [`Schema`], the client serializes `Input` and decodes `Output`.
#[async_trait]
pub trait Procedure: Send + Sync + 'static {
    const GROUP: &'static str;
    const NAME: &'static str;

    type Input: Schema + Serialize + Send + 'static;
    type Output: Serialize + DeserializeOwned + Send + 'static;

    async fn call(&self, ctx: &AuthContext, input: Self::Input) -> Result<Self::Output, RpcError>;

    #[must_use]
    fn path() -> String {
        format!("{}.{}", Self::GROUP, Self::NAME)
    }
}

/// A procedure composed into the application's router tree.
///
/// Only the `router_tree!` declaration in [`crate::rpc::procedures`] implements
/// this, and the trait is sealed, so [`RpcClient::call`](crate::rpc::RpcClient::call)
/// rejects at compile time any procedure the server does not serve:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use portal_server::domain::auth::AuthContext;
/// use portal_server::rpc::{LocalTransport, Procedure, RpcClient, RpcError};
///
/// struct NotComposed;
///
/// #[async_trait]
/// impl Procedure for NotComposed {
///     const GROUP: &'static str = "public";
///     const NAME: &'static str = "secret";
///     type Input = ();
///     type Output = ();
///
///     async fn call(&self, _ctx: &AuthContext, _input: ()) -> Result<(), RpcError> {
///         Ok(())
///     }
/// }
///
/// async fn call_it(client: &RpcClient<LocalTransport>) {
///     // `NotComposed: Routed` is not satisfied.
///     let _ = client.call::<NotComposed>(()).await;
/// }
/// ```
pub trait Routed: Procedure + sealed::Sealed {}

pub(crate) mod sealed {
    #[allow(unreachable_pub)]
    pub trait Sealed {}
}

/// Type-erased procedure: JSON in, JSON out.
#[async_trait]
pub(crate) trait Handler: Send + Sync {
    async fn invoke(&self, ctx: &AuthContext, input: Value) -> Result<Value, RpcError>;
}

struct Bound<P>(P);

#[async_trait]
impl<P: Procedure> Handler for Bound<P> {
    async fn invoke(&self, ctx: &AuthContext, input: Value) -> Result<Value, RpcError> {
        let input = P::Input::validate(&input)?;
        let output = self.0.call(ctx, input).await?;
        serde_json::to_value(output).map_err(|e| RpcError::Internal(format!("unserializable output: {e}")))
    }
}

pub(crate) struct Entry {
    pub(crate) declared_group: &'static str,
    pub(crate) name: &'static str,
    pub(crate) handler: Box<dyn Handler>,
}

/// A named collection of procedures. Its name is assigned when composed.
#[derive(Default)]
pub struct ProcedureGroup {
    pub(crate) entries: Vec<Entry>,
}

impl ProcedureGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn procedure<P: Procedure>(mut self, procedure: P) -> Self {
        self.entries.push(Entry { declared_group: P::GROUP, name: P::NAME, handler: Box::new(Bound(procedure)) });
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }
}

impl fmt::Debug for ProcedureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureGroup").field("procedures", &self.names().collect::<Vec<_>>()).finish()
    }
}
