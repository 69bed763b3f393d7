//! Procedures about the signed-in caller. All of them deny anonymous callers.

use crate::domain::auth::AuthContext;
use crate::rpc::procedures::VIEWER;
use crate::rpc::{Procedure, RpcError};
use crate::schemas::user::User;
use async_trait::async_trait;

/// `viewer.me`: the caller's user record.
#[derive(Debug)]
pub struct Me;

#[async_trait]
impl Procedure for Me {
    const GROUP: &'static str = VIEWER;
    const NAME: &'static str = "me";
    type Input = ();
    type Output = User;

    async fn call(&self, ctx: &AuthContext, _input: ()) -> Result<User, RpcError> {
        ctx.require_current_user_id()?;
        ctx.session()
            .map(|session| session.user.clone())
            .ok_or_else(|| RpcError::Internal("authenticated context without a session".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{ActiveSession, UnauthenticatedReason};
    use crate::schemas::user::UserId;

    #[tokio::test]
    async fn test_me_requires_session() {
        let err = Me.call(&AuthContext::denied(UnauthenticatedReason::SessionExpired), ()).await.unwrap_err();
        assert!(matches!(err, RpcError::Unauthenticated(e) if e.reason == UnauthenticatedReason::SessionExpired));
    }

    #[tokio::test]
    async fn test_me_returns_user() {
        let user = User::new(UserId::new("u1").unwrap());
        let ctx = AuthContext::authenticated(ActiveSession { user: user.clone(), access_token: "t".into(), expires_at: 0 });

        assert_eq!(Me.call(&ctx, ()).await.unwrap(), user);
    }
}
