#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use crate::adapters::identity::{IdentityProvider, JwtIdentityProvider};
use crate::api::{AppState, MgmtState};
use crate::config::Config;
use crate::domain::locale::Locales;
use crate::error::ConfigurationError;
use crate::services::auth_gate::AuthGate;
use crate::services::health_service::HealthService;
use std::sync::Arc;
use tokio::sync::watch;

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod rpc;
pub mod schemas;
pub mod services;
pub mod telemetry;

/// Everything the listeners need, assembled once at startup.
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub mgmt: MgmtState,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, identity: None }
    }

    /// Replaces the default JWT-verifying identity provider.
    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Wires the application together.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] if locales or the router tree are malformed.
    pub fn build(self) -> Result<App, ConfigurationError> {
        let locales = Locales::from_config(&self.config.locale)?;
        let router = rpc::procedures::app_router_tree(&locales)?;

        let identity = self.identity.unwrap_or_else(|| Arc::new(JwtIdentityProvider::new(&self.config.auth)));
        let health_service = HealthService::new(Arc::clone(&identity), self.config.health.clone());
        let auth_gate = AuthGate::new(identity);

        tracing::info!(procedures = ?router.paths(), locales = ?locales.supported(), "router tree composed");

        Ok(App {
            state: AppState { config: self.config, router: Arc::new(router), auth_gate, locales: Arc::new(locales) },
            mgmt: MgmtState { health_service },
        })
    }
}

/// Routes panics through tracing so they reach the structured log.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(panic.location = %location, panic.payload = %payload, "panic");
    }));
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
