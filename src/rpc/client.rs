use crate::domain::auth::AuthContext;
use crate::rpc::{RouterTree, Routed, RpcError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Carries a serialized call to a router and brings back the serialized result.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, path: &str, input: Value) -> Result<Value, RpcError>;
}

/// Client handle whose callable surface is exactly the set of [`Routed`] procedures,
/// i.e. those composed into the application's router tree.
///
/// It adds no validation of its own; the router validates every input it receives.
#[derive(Debug, Clone)]
pub struct RpcClient<T> {
    transport: T,
}

impl<T: Transport> RpcClient<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Calls `P` with `input`.
    ///
    /// # Errors
    /// Whatever the router or the transport reports.
    pub async fn call<P: Routed>(&self, input: P::Input) -> Result<P::Output, RpcError> {
        let body = serde_json::to_value(&input).map_err(|e| RpcError::Transport(format!("unserializable input: {e}")))?;
        let output = self.transport.send(&P::path(), body).await?;
        serde_json::from_value(output).map_err(|e| RpcError::Transport(format!("undecodable output: {e}")))
    }
}

/// Dispatches straight into an in-process router, for server-side callers that
/// already hold a resolved [`AuthContext`].
#[derive(Debug, Clone)]
pub struct LocalTransport {
    router: Arc<RouterTree>,
    ctx: AuthContext,
}

impl LocalTransport {
    #[must_use]
    pub const fn new(router: Arc<RouterTree>, ctx: AuthContext) -> Self {
        Self { router, ctx }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, path: &str, input: Value) -> Result<Value, RpcError> {
        self.router.dispatch(path, &self.ctx, input).await
    }
}

impl RpcClient<LocalTransport> {
    /// A client that calls `router` directly as the caller described by `ctx`.
    #[must_use]
    pub const fn local(router: Arc<RouterTree>, ctx: AuthContext) -> Self {
        Self::new(LocalTransport::new(router, ctx))
    }
}
