use crate::schemas::user::User;
use crate::schemas::{Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token bundle issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// Absolute expiry as unix seconds.
    pub expires_at: i64,
    pub token_type: String,
}

impl Schema for Session {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let obj = v.object(value)?;

        let access_token = v.required(obj, "access_token");
        let refresh_token = v.required(obj, "refresh_token");
        let expires_in = v.required(obj, "expires_in");
        let expires_at = v.required(obj, "expires_at");
        let token_type = v.required(obj, "token_type");

        Some(Self {
            access_token: access_token?,
            refresh_token: refresh_token?,
            expires_in: expires_in?,
            expires_at: expires_at?,
            token_type: token_type?,
        })
    }
}

/// Answer to "who is signed in". Both keys are always present on the wire, `null` when absent.
///
/// Decode only through [`Schema::validate`]: a plain serde decode would treat an
/// omitted key as `null`, so this type does not implement `Deserialize`:
///
/// ```compile_fail
/// let _: portal_server::schemas::auth::AuthResponse = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl AuthResponse {
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None, session: None }
    }

    #[must_use]
    pub const fn signed_in(user: User, session: Session) -> Self {
        Self { user: Some(user), session: Some(session) }
    }

    /// Whether user and session are both present or both absent.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.user.is_some() == self.session.is_some()
    }
}

impl Schema for AuthResponse {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let obj = v.object(value)?;

        let user = v.nullable::<User>(obj, "user");
        let session = v.nullable::<Session>(obj, "session");

        Some(Self { user: user?, session: session? })
    }
}
