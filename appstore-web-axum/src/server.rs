//! Core server-related functionality.

use crate::config::{ServerConfig, WebConfig};
use crate::router::RouterBootstrap;
use crate::runner::{ApplicationRunner, BoxFuture, ErrorPtr, FutureExt};
use derive_more::Constructor;
use futures::future::try_join_all;
use hyper::server::conn::AddrIncoming;
use hyper::server::Builder;
use hyper::Error as HyperError;
use std::future::Future;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Errors related to bootstrapping servers.
#[derive(Error, Debug)]
pub enum ServerBootstrapError {
    #[error("Error parsing listen address: {0}")]
    ListenAddressParseError(AddrParseError),
    #[error("Error binding server: {0}")]
    BindError(#[source] HyperError),
    #[error("Error registering shutdown signal: {0}")]
    ShutdownSignalError(#[source] ErrorPtr),
}

/// Sending a value through this sender initiates a graceful shutdown of all servers.
pub type ShutdownSignalSender = broadcast::Sender<()>;

/// Binds listeners for servers described by [ServerConfig]. Implement this trait to customize how
/// listeners are created.
pub trait ServerBootstrap {
    /// Binds a listener for given server and returns a [Builder] ready to serve a router.
    fn bootstrap_server(
        &self,
        config: &ServerConfig,
    ) -> BoxFuture<'_, Result<Builder<AddrIncoming>, ServerBootstrapError>>;
}

/// Binds servers to their configured listen address.
#[derive(Default)]
pub struct DefaultServerBootstrap;

impl ServerBootstrap for DefaultServerBootstrap {
    fn bootstrap_server(
        &self,
        config: &ServerConfig,
    ) -> BoxFuture<'_, Result<Builder<AddrIncoming>, ServerBootstrapError>> {
        let address = config
            .listen_address
            .parse::<SocketAddr>()
            .map_err(ServerBootstrapError::ListenAddressParseError);

        async move {
            let address = address?;
            debug!(%address, "Binding server.");

            axum::Server::try_bind(&address).map_err(ServerBootstrapError::BindError)
        }
        .boxed()
    }
}

/// Source of the shutdown signal for running servers. The sender is registered after all servers
/// are bound, but before they start accepting connections.
pub trait ShutdownSignalSource {
    fn register_shutdown(&self, shutdown_sender: ShutdownSignalSender) -> Result<(), ErrorPtr>;
}

/// Shuts servers down on Ctrl-C.
#[derive(Default)]
pub struct CtrlCShutdownSignalSource;

impl ShutdownSignalSource for CtrlCShutdownSignalSource {
    fn register_shutdown(&self, shutdown_sender: ShutdownSignalSender) -> Result<(), ErrorPtr> {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl-C, shutting down.");
                    // servers which already stopped have no receivers left
                    let _ = shutdown_sender.send(());
                }
                Err(error) => warn!(%error, "Cannot listen for Ctrl-C."),
            }
        });

        Ok(())
    }
}

/// [ApplicationRunner] starting all configured servers and waiting for them to shut down.
#[derive(Constructor)]
pub struct ServerRunner {
    config: WebConfig,
    router_bootstrap: RouterBootstrap,
    server_bootstrap: Arc<dyn ServerBootstrap + Send + Sync>,
    shutdown_signal_source: Arc<dyn ShutdownSignalSource + Send + Sync>,
}

impl ApplicationRunner for ServerRunner {
    fn run(&self) -> BoxFuture<'_, Result<(), ErrorPtr>> {
        async {
            let (shutdown_sender, _) = broadcast::channel(1);
            let servers = self
                .create_servers(&shutdown_sender)
                .await
                .map_err(|error| Arc::new(error) as ErrorPtr)?;

            self.shutdown_signal_source
                .register_shutdown(shutdown_sender.clone())
                .map_err(|error| {
                    Arc::new(ServerBootstrapError::ShutdownSignalError(error)) as ErrorPtr
                })?;

            try_join_all(servers.into_iter()).await.map(|_| ())
        }
        .boxed()
    }
}

impl ServerRunner {
    async fn create_server(
        &self,
        config: &ServerConfig,
        server_name: &str,
        shutdown_sender: &ShutdownSignalSender,
    ) -> Result<impl Future<Output = Result<(), ErrorPtr>>, ServerBootstrapError> {
        let router = self.router_bootstrap.bootstrap_router(server_name);
        let mut shutdown_receiver = shutdown_sender.subscribe();
        let server_name = server_name.to_string();

        self.server_bootstrap
            .bootstrap_server(config)
            .await
            .map(move |builder| async move {
                let server = builder.serve(router.into_make_service());
                info!(%server_name, address = %server.local_addr(), "Server listening.");

                server
                    .with_graceful_shutdown(async move {
                        // a closed channel means nobody can ever request shutdown
                        if shutdown_receiver.recv().await.is_err() {
                            futures::future::pending::<()>().await;
                        }
                    })
                    .await
                    .map_err(|error| Arc::new(error) as ErrorPtr)
            })
    }

    async fn create_servers(
        &self,
        shutdown_sender: &ShutdownSignalSender,
    ) -> Result<Vec<impl Future<Output = Result<(), ErrorPtr>>>, ServerBootstrapError> {
        let mut result = Vec::with_capacity(self.config.servers.len());
        for (server_name, config) in self.config.servers.iter() {
            result.push(
                self.create_server(config, server_name, shutdown_sender)
                    .await?,
            );
        }

        Ok(result)
    }
}
