use crate::adapters::identity::IdentityProvider;
use crate::config::HealthConfig;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("portal-server");
        Self {
            status: meter
                .i64_gauge("portal_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    identity: Arc<dyn IdentityProvider>,
    config: HealthConfig,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, config: HealthConfig) -> Self {
        Self { identity, config, metrics: Metrics::new() }
    }

    /// Checks that the identity provider can answer lookups.
    ///
    /// # Errors
    /// Returns a string describing the failure if the provider is unreachable.
    pub async fn check_identity(&self) -> Result<(), String> {
        let identity_timeout = Duration::from_millis(self.config.identity_timeout_ms);

        match timeout(identity_timeout, self.identity.ping()).await {
            Ok(Ok(())) => {
                self.metrics.status.record(1, &[KeyValue::new("component", "identity")]);
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "identity")]);
                Err(format!("Identity provider check failed: {e}"))
            }
            Err(_) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "identity")]);
                Err("Identity provider check timed out".to_string())
            }
        }
    }
}
