//! Startup wiring: configuration → discovery → registry → transport.
//!
//! The registry is built once, frozen in an `Arc` and published into the
//! server's GET table before the listener binds. Nothing here is global.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use microweb_config::{LogFormat, LoggingConfig, MicrowebConfig};
use microweb_router::{
    ControllerCatalog, ControllerDescriptor, DuplicatePolicy, RegistryError, RouteRegistry,
};
use microweb_server::{Server, ServerConfig, ServerError, ShutdownSignal, StaticFilesSettings};
use microweb_telemetry::LogConfig;
use thiserror::Error;

use crate::webapp;

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A controller could not be resolved, built or registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The transport failed to bind or serve.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Builds and runs the application from a [`MicrowebConfig`].
///
/// # Example
///
/// ```rust
/// use microweb::Bootstrap;
/// use microweb_config::MicrowebConfig;
///
/// let registry = Bootstrap::new(MicrowebConfig::default())
///     .with_controllers(vec!["GreetingController".to_string()])
///     .build_registry()
///     .unwrap();
///
/// assert_eq!(registry.paths(), vec!["/greeting"]);
/// ```
#[derive(Debug)]
pub struct Bootstrap {
    config: MicrowebConfig,
    catalog: ControllerCatalog,
    controllers: Vec<String>,
}

impl Bootstrap {
    /// Uses the bundled controller catalog and the configured controller list.
    #[must_use]
    pub fn new(config: MicrowebConfig) -> Self {
        let controllers = config.routing.controllers.clone();
        Self {
            config,
            catalog: webapp::catalog(),
            controllers,
        }
    }

    /// Replaces the controller catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ControllerCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Registers exactly these controllers instead of scanning.
    ///
    /// An empty list keeps the configured selection.
    #[must_use]
    pub fn with_controllers(mut self, names: Vec<String>) -> Self {
        if !names.is_empty() {
            self.controllers = names;
        }
        self
    }

    /// The effective configuration.
    #[must_use]
    pub const fn config(&self) -> &MicrowebConfig {
        &self.config
    }

    /// Resolves, instantiates and registers every selected controller.
    pub fn build_registry(&self) -> Result<RouteRegistry, BootstrapError> {
        let policy = if self.config.routing.reject_duplicate_routes {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Overwrite
        };
        let mut registry = RouteRegistry::with_policy(policy);

        for descriptor in self.selected()? {
            let controller = descriptor.instantiate()?;
            let routes = registry.register(controller)?;
            tracing::info!(
                controller = %descriptor.type_name(),
                routes,
                "registered controller"
            );
        }

        Ok(registry)
    }

    fn selected(&self) -> Result<Vec<&ControllerDescriptor>, RegistryError> {
        if self.controllers.is_empty() {
            Ok(self.catalog.discover(&self.config.routing.base_namespace))
        } else {
            self.controllers
                .iter()
                .map(|name| self.catalog.find(name))
                .collect()
        }
    }

    /// Builds the registry and a server with every route published.
    pub fn build_server(&self) -> Result<(Server, Arc<RouteRegistry>), BootstrapError> {
        let registry = Arc::new(self.build_registry()?);
        let mut server = Server::new(server_config(&self.config));
        let published = registry.publish(server.routes_mut());
        tracing::debug!(routes = registry.len(), published, "published routes");
        Ok((server, registry))
    }

    /// Builds everything and serves until `shutdown`.
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<(), BootstrapError> {
        let (server, _registry) = self.build_server()?;
        let bound = server.bind().await?;
        tracing::info!(url = %format!("http://{}/", bound.local_addr()), "server ready");
        bound.serve(shutdown).await?;
        Ok(())
    }
}

/// Maps the file/env configuration onto transport settings.
#[must_use]
pub fn server_config(config: &MicrowebConfig) -> ServerConfig {
    let mut builder = ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .max_connections(config.server.max_connections);

    let files = &config.static_files;
    if files.enabled {
        let root = PathBuf::from(&files.root);
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "static file root does not exist");
        }
        builder = builder.static_files(StaticFilesSettings {
            root,
            index_file: files.index_file.clone(),
            cache_max_age_secs: files.cache_max_age_secs,
            serve_hidden: files.serve_hidden,
        });
    }

    builder.build()
}

/// Maps the logging section onto the subscriber settings.
#[must_use]
pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        json_format: logging.format == LogFormat::Json,
        file_line_info: logging.include_location,
        ansi: logging.ansi_enabled,
        service_name: logging.service_name.clone(),
        ..LogConfig::default()
    }
}
