//! Procedures callable without a session.

use crate::domain::auth::AuthContext;
use crate::domain::locale::Locales;
use crate::rpc::procedures::PUBLIC;
use crate::rpc::{Procedure, RpcError};
use crate::schemas::{Reason, Schema, Validator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong {
    pub status: String,
    pub version: String,
}

/// `public.ping`: liveness as seen through the RPC surface.
#[derive(Debug)]
pub struct Ping;

#[async_trait]
impl Procedure for Ping {
    const GROUP: &'static str = PUBLIC;
    const NAME: &'static str = "ping";
    type Input = ();
    type Output = Pong;

    async fn call(&self, _ctx: &AuthContext, _input: ()) -> Result<Pong, RpcError> {
        Ok(Pong { status: "ok".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingInput {
    pub name: String,
}

impl Schema for GreetingInput {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let obj = v.object(value)?;
        let name = v.required::<String>(obj, "name")?;

        let trimmed = name.trim();
        if trimmed.is_empty() {
            v.report_field("name", Reason::Empty);
            return None;
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            v.report_field("name", Reason::Invalid(format!("must be at most {MAX_NAME_LEN} characters")));
            return None;
        }

        Some(Self { name: trimmed.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingOutput {
    pub message: String,
}

/// `public.greeting`: greets by name, noting whether the caller is signed in.
#[derive(Debug)]
pub struct Greeting;

#[async_trait]
impl Procedure for Greeting {
    const GROUP: &'static str = PUBLIC;
    const NAME: &'static str = "greeting";
    type Input = GreetingInput;
    type Output = GreetingOutput;

    async fn call(&self, ctx: &AuthContext, input: GreetingInput) -> Result<GreetingOutput, RpcError> {
        let message = if ctx.get_current_user_id().is_some() {
            format!("Welcome back, {}!", input.name)
        } else {
            format!("Hello, {}!", input.name)
        };
        Ok(GreetingOutput { message })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleList {
    pub supported: Vec<String>,
    pub default_locale: String,
}

/// `public.locales`: the locales pages can be routed under.
#[derive(Debug)]
pub struct SupportedLocales {
    supported: Vec<String>,
    default_locale: String,
}

impl SupportedLocales {
    #[must_use]
    pub fn new(locales: &Locales) -> Self {
        Self { supported: locales.supported().to_vec(), default_locale: locales.default_locale().to_string() }
    }
}

#[async_trait]
impl Procedure for SupportedLocales {
    const GROUP: &'static str = PUBLIC;
    const NAME: &'static str = "locales";
    type Input = ();
    type Output = LocaleList;

    async fn call(&self, _ctx: &AuthContext, _input: ()) -> Result<LocaleList, RpcError> {
        Ok(LocaleList { supported: self.supported.clone(), default_locale: self.default_locale.clone() })
    }
}
