//! Core application functionality.

use crate::config::ApplicationConfig;
use crate::controller::{AppController, ControllerPtr};
use crate::router::RouterBootstrap;
use crate::runner::{ApplicationRunnerPtr, ErrorPtr};
use crate::server::{
    CtrlCShutdownSignalSource, DefaultServerBootstrap, ServerRunner, ShutdownSignalSource,
};
use appstore::repository::{AppRepositoryPtr, InMemoryAppRepository};
use config::ConfigError;
use derive_more::Constructor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigError(#[source] ConfigError),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Main entrypoint for the application. Installs supporting infrastructure and runs
/// [ApplicationRunners](crate::runner::ApplicationRunner).
#[derive(Constructor)]
pub struct Application {
    config: ApplicationConfig,
    runners: Vec<ApplicationRunnerPtr>,
}

impl Application {
    pub async fn run(&mut self) -> Result<(), ApplicationError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        self.runners
            .sort_unstable_by_key(|runner| -i16::from(runner.priority()));

        info!("Running application runners...");

        for runner in &self.runners {
            runner.run().await.map_err(ApplicationError::RunnerError)?;
        }

        Ok(())
    }
}

fn install_tracing_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        debug!("Global tracing subscriber already installed.");
    }
}

/// Creates an application serving the App resource from an in-memory repository, using given
/// configuration and shutdown signal.
pub fn create(
    config: ApplicationConfig,
    shutdown_signal_source: Arc<dyn ShutdownSignalSource + Send + Sync>,
) -> Application {
    let repository: Arc<AppRepositoryPtr> = Arc::new(InMemoryAppRepository::default());
    let controllers: Vec<ControllerPtr> = vec![Arc::new(AppController::new(repository))];

    let server_runner = ServerRunner::new(
        config.web.clone(),
        RouterBootstrap::new(controllers),
        Arc::new(DefaultServerBootstrap),
        shutdown_signal_source,
    );

    Application::new(config, vec![Arc::new(server_runner) as ApplicationRunnerPtr])
}

/// Creates an application with configuration read from the environment, which shuts down on
/// Ctrl-C.
pub fn create_default() -> Result<Application, ApplicationError> {
    let config = ApplicationConfig::init_from_environment().map_err(ApplicationError::ConfigError)?;
    Ok(create(config, Arc::new(CtrlCShutdownSignalSource)))
}
