use crate::adapters::identity::{IdentityProvider, TokenStatus};
use crate::domain::auth::{AuthContext, UnauthenticatedReason};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    resolutions: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("portal-server");
        Self {
            resolutions: meter
                .u64_counter("portal_auth_gate_total")
                .with_description("Auth gate resolutions by outcome")
                .build(),
        }
    }

    fn record(&self, outcome: &'static str) {
        self.resolutions.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}

/// Answers "who, if anyone, is calling". Every protected page and procedure reads
/// the [`AuthContext`] this produces.
#[derive(Clone, Debug)]
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
    metrics: Metrics,
}

impl AuthGate {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider, metrics: Metrics::new() }
    }

    /// Resolves the caller once. Never fails: provider errors deny access.
    #[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty, outcome = tracing::field::Empty))]
    pub async fn resolve(&self, access_token: Option<&str>) -> AuthContext {
        let ctx = match access_token.filter(|t| !t.is_empty()) {
            None => AuthContext::anonymous(),
            Some(token) => match self.provider.lookup(token).await {
                Ok(TokenStatus::Active(session)) => AuthContext::authenticated(session),
                Ok(TokenStatus::Expired) => AuthContext::denied(UnauthenticatedReason::SessionExpired),
                Ok(TokenStatus::Invalid) => AuthContext::denied(UnauthenticatedReason::InvalidToken),
                Err(e) => {
                    tracing::warn!(error = %e, "Identity lookup failed, denying access");
                    AuthContext::denied(UnauthenticatedReason::ProviderUnavailable)
                }
            },
        };

        let span = tracing::Span::current();
        let outcome = match ctx.denial() {
            Some(reason) => reason.as_str(),
            None => {
                if let Some(user_id) = ctx.get_current_user_id() {
                    span.record("user_id", tracing::field::display(user_id));
                }
                "authenticated"
            }
        };
        span.record("outcome", outcome);
        self.metrics.record(outcome);

        ctx
    }
}
