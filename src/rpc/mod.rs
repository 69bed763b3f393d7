//! Typed remote procedures.
//!
//! A procedure is declared once as a type implementing [`Procedure`]. The server
//! composes procedures into [`ProcedureGroup`]s and groups into a [`RouterTree`].
//! The application tree is declared once in [`procedures`], which also marks each
//! composed procedure [`Routed`]. Clients call through [`RpcClient`], whose surface
//! is the set of `Routed` types, so an uncomposed procedure or a mis-shaped input
//! does not compile. The router still validates every input it receives.

use crate::domain::auth::Unauthenticated;
use crate::error::AppError;
use crate::schemas::ValidationError;
use crate::schemas::error::ErrorResponse;

pub mod client;
pub mod procedure;
pub mod procedures;
pub mod router;

pub use client::{LocalTransport, RpcClient, Transport};
pub use procedure::{Procedure, ProcedureGroup, Routed};
pub use router::{RouterTree, compose};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("procedure '{0}' not found")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unauthenticated(#[from] Unauthenticated),
    /// An error envelope returned by a remote router.
    #[error("remote error: {}", .0.error)]
    Remote(ErrorResponse),
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("procedure failed: {0}")]
    Internal(String),
}

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::NotFound(path) => Self::NotFound(format!("procedure '{path}'")),
            RpcError::Validation(e) => Self::Validation(e),
            RpcError::Unauthenticated(e) => Self::Unauthenticated(e),
            RpcError::Remote(resp) => {
                tracing::error!(error = %resp.error, "Unexpected remote error inside the server");
                Self::Internal
            }
            RpcError::Transport(e) | RpcError::Internal(e) => {
                tracing::error!(error = %e, "Procedure failed");
                Self::Internal
            }
        }
    }
}
