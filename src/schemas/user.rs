use crate::schemas::{Reason, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Opaque identifier assigned by the identity provider. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for an empty identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Schema for UserId {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let raw = String::read(v, value)?;
        let id = Self::new(raw);
        if id.is_none() {
            v.report(Reason::Empty);
        }
        id
    }
}

impl Schema for OffsetDateTime {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let raw = String::read(v, value)?;
        match Self::parse(&raw, &Rfc3339) {
            Ok(ts) => Some(ts),
            Err(_) => {
                v.report(Reason::Invalid("expected an RFC 3339 timestamp".into()));
                None
            }
        }
    }
}

/// A user record as produced by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    #[must_use]
    pub const fn new(id: UserId) -> Self {
        Self { id, email: None, phone: None, display_name: None, avatar_url: None, created_at: None }
    }
}

impl Schema for User {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let obj = v.object(value)?;

        let id = v.required::<UserId>(obj, "id");
        let email = v.optional::<String>(obj, "email");
        let phone = v.optional::<String>(obj, "phone");
        let display_name = v.optional::<String>(obj, "display_name");
        let avatar_url = v.optional::<String>(obj, "avatar_url");
        let created_at = v.optional::<OffsetDateTime>(obj, "created_at");

        if email.as_ref().and_then(Option::as_deref).is_some_and(|address| !looks_like_email(address)) {
            v.report_field("email", Reason::Invalid("expected an email address".into()));
            return None;
        }

        Some(Self {
            id: id?,
            email: email?,
            phone: phone?,
            display_name: display_name?,
            avatar_url: avatar_url?,
            created_at: created_at?,
        })
    }
}

/// `local@domain`, both parts non-empty. Single-label domains such as `localhost` are allowed.
fn looks_like_email(address: &str) -> bool {
    !address.chars().any(char::is_whitespace)
        && address
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
}
