//! Reusable congestion tax server runtime.
//!
//! [`ServerHandle`] owns the server lifecycle: metrics recorder, rule
//! loading, REST API and graceful shutdown. [`build_tax_service`] is the
//! same rule bootstrap without the HTTP part, for one-shot calculations.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};

use crate::application::TaxService;
use crate::config::{AppConfig, RulesConfig};
use crate::infrastructure::rules::{RuleLoader, RuleRegistry};
use crate::interfaces::create_api_router;
use crate::support::errors::{AppResult, InfraError};
use crate::support::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Install the Prometheus recorder and serve `/metrics` (default: true).
    pub metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            metrics: true,
        }
    }
}

// ── Rule bootstrap ─────────────────────────────────────────────────

/// Load the configured rules into a fresh registry and wrap it in a
/// [`TaxService`].
///
/// Fails on the first unreadable or invalid rule file, and when no rules
/// were loaded at all.
pub fn build_tax_service(rules: &RulesConfig) -> AppResult<Arc<TaxService>> {
    let registry = RuleRegistry::shared();
    let loader = RuleLoader::new(registry.clone());

    if rules.include_builtin {
        loader.load_builtin()?;
    }
    let loaded = loader.load_paths(&rules.paths)?;
    info!(files = loaded, cities = registry.len(), "📚 Tax rules ready");

    if registry.is_empty() {
        return Err(InfraError::NoRulesLoaded.into());
    }
    if !registry.contains(&rules.default_city) {
        warn!(
            default_city = rules.default_city.as_str(),
            "Default city has no rules; requests without ?city= will fail"
        );
    }

    Ok(Arc::new(TaxService::new(registry, rules.default_city.clone())))
}

/// The global metrics recorder can only be installed once per process, so
/// a restart within the same process reuses the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                error!("Failed to install Prometheus metrics recorder: {}", e);
                None
            }
        })
        .clone()
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running congestion tax server.
///
/// ```rust,no_run
/// use congestion_tax::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub tax_service: Arc<TaxService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port actually bound (differs from the config when it asked for 0).
    pub api_port: u16,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Load rules, bind the API listener and start serving.
    pub async fn start(opts: ServerOptions) -> AppResult<Self> {
        let app_cfg = opts.config;

        info!("Starting congestion tax service...");

        let prometheus = if opts.metrics {
            prometheus_handle()
        } else {
            None
        };

        let tax_service = build_tax_service(&app_cfg.rules)?;
        let api_router = create_api_router(Arc::clone(&tax_service), prometheus);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(|source| InfraError::Bind {
                addr: api_addr.clone(),
                source,
            })?;
        let api_port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(app_cfg.server.api_port);
        info!("REST API server listening on http://{}:{}", app_cfg.server.api_host, api_port);
        info!("Swagger UI available at http://{}:{}/docs/", app_cfg.server.api_host, api_port);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Congestion tax service started.");

        Ok(Self {
            tax_service,
            config: app_cfg,
            api_port,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait, bounded by the configured shutdown timeout, for in-flight
    /// requests to finish once shutdown has been triggered.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let timeout_secs = self.shutdown.timeout_secs();
        let api_task = self.api_task;
        let finished = self
            .shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;

        if !finished {
            warn!("Abandoning in-flight requests after {}s", timeout_secs);
        }

        info!("👋 Congestion tax service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down congestion tax service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
