use crate::config::AuthConfig;
use crate::domain::auth::ActiveSession;
use crate::schemas::user::User;
use crate::schemas::{Schema, ValidationError};
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// What the identity provider knows about a presented access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Active(ActiveSession),
    Expired,
    Invalid,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// The external collaborator that turns an access token into a session.
#[async_trait]
pub trait IdentityProvider: Send + Sync + Debug {
    async fn lookup(&self, access_token: &str) -> Result<TokenStatus, IdentityError>;

    /// Readiness check. Providers that verify locally are always ready.
    async fn ping(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Access token claims as issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl Claims {
    /// Maps the claims onto the `User` wire shape and validates it like any other input.
    /// Empty strings count as absent.
    fn into_user(self) -> Result<User, ValidationError> {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::String(self.sub));

        let optional = [
            ("email", self.email),
            ("phone", self.phone),
            ("display_name", self.user_metadata.full_name),
            ("avatar_url", self.user_metadata.avatar_url),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.insert(key.into(), Value::String(value));
            }
        }

        User::validate(&Value::Object(fields))
    }
}

/// Verifies HS256 access tokens locally with the shared project secret.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityProvider").field("algorithms", &self.validation.algorithms).finish_non_exhaustive()
    }
}

impl JwtIdentityProvider {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.leeway = config.jwt_leeway_secs;

        Self { key: DecodingKey::from_secret(config.jwt_secret.as_bytes()), validation }
    }

    fn verify(&self, access_token: &str) -> TokenStatus {
        let claims = match decode::<Claims>(access_token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => return TokenStatus::Expired,
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected");
                return TokenStatus::Invalid;
            }
        };

        let expires_at = claims.exp;
        match claims.into_user() {
            Ok(user) => TokenStatus::Active(ActiveSession { user, access_token: access_token.to_string(), expires_at }),
            Err(e) => {
                tracing::debug!(issues = %e, "Access token claims do not describe a valid user");
                TokenStatus::Invalid
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn lookup(&self, access_token: &str) -> Result<TokenStatus, IdentityError> {
        Ok(self.verify(access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret".to_string(),
            jwt_audience: "authenticated".to_string(),
            jwt_leeway_secs: 0,
            access_cookie: "sb-access-token".to_string(),
            refresh_cookie: "sb-refresh-token".to_string(),
        }
    }

    fn now() -> i64 {
        i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()).unwrap()
    }

    fn claims(sub: &str, exp: i64) -> Claims {
        Claims {
            sub: sub.to_string(),
            exp,
            aud: Some("authenticated".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some(String::new()),
            user_metadata: UserMetadata { full_name: Some("Ada".into()), avatar_url: None },
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token() {
        let provider = JwtIdentityProvider::new(&config());
        let exp = now() + 3600;
        let token = sign(&claims("u1", exp), "test_secret");

        let TokenStatus::Active(session) = provider.lookup(&token).await.unwrap() else {
            panic!("expected an active session");
        };

        assert_eq!(session.user.id.as_str(), "u1");
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.user.phone, None);
        assert_eq!(session.user.display_name.as_deref(), Some("Ada"));
        assert_eq!(session.expires_at, exp);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let provider = JwtIdentityProvider::new(&config());
        let token = sign(&claims("u1", now() - 600), "test_secret");

        assert_eq!(provider.lookup(&token).await.unwrap(), TokenStatus::Expired);
    }

    #[tokio::test]
    async fn test_wrong_secret_and_garbage() {
        let provider = JwtIdentityProvider::new(&config());
        let token = sign(&claims("u1", now() + 3600), "other_secret");

        assert_eq!(provider.lookup(&token).await.unwrap(), TokenStatus::Invalid);
        assert_eq!(provider.lookup("not.a.jwt").await.unwrap(), TokenStatus::Invalid);
    }

    #[tokio::test]
    async fn test_wrong_audience() {
        let provider = JwtIdentityProvider::new(&config());
        let mut c = claims("u1", now() + 3600);
        c.aud = Some("anon".into());

        assert_eq!(provider.lookup(&sign(&c, "test_secret")).await.unwrap(), TokenStatus::Invalid);
    }

    #[tokio::test]
    async fn test_claims_are_validated_as_user() {
        let provider = JwtIdentityProvider::new(&config());

        let mut c = claims("u1", now() + 3600);
        c.email = Some("admin@localhost".into());
        let TokenStatus::Active(session) = provider.lookup(&sign(&c, "test_secret")).await.unwrap() else {
            panic!("expected an active session");
        };
        assert_eq!(session.user.email.as_deref(), Some("admin@localhost"));

        c.email = Some("not-an-address".into());
        assert_eq!(provider.lookup(&sign(&c, "test_secret")).await.unwrap(), TokenStatus::Invalid);
    }

    #[tokio::test]
    async fn test_empty_subject() {
        let provider = JwtIdentityProvider::new(&config());
        let token = sign(&claims("", now() + 3600), "test_secret");

        assert_eq!(provider.lookup(&token).await.unwrap(), TokenStatus::Invalid);
    }
}
