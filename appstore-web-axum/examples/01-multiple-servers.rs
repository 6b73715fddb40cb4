// note: this example assumes you've analyzed the previous one

use appstore::repository::{AppRepositoryPtr, InMemoryAppRepository};
use appstore_web_axum::application::Application;
use appstore_web_axum::axum::routing::get;
use appstore_web_axum::axum::Router;
use appstore_web_axum::config::{ApplicationConfig, ServerConfig};
use appstore_web_axum::controller::{AppController, Controller, ControllerPtr};
use appstore_web_axum::router::RouterBootstrap;
use appstore_web_axum::runner::ApplicationRunnerPtr;
use appstore_web_axum::server::{CtrlCShutdownSignalSource, DefaultServerBootstrap, ServerRunner};
use fxhash::FxHashSet;
use std::sync::Arc;

// a controller which should only be reachable on the "admin" server
struct HealthController;

impl Controller for HealthController {
    fn configure_router(&self, router: Router) -> Router {
        router.route("/health", get(|| async { "OK" }))
    }

    fn server_names(&self) -> Option<FxHashSet<String>> {
        Some(["admin".to_string()].into_iter().collect())
    }
}

#[tokio::main]
async fn main() {
    // the easiest way to create multiple server instances is to use the configuration file, but
    // for the sake of example, the config is created here
    let mut public_config = ServerConfig::default();
    public_config.listen_address = "127.0.0.1:8080".to_string();

    let mut admin_config = ServerConfig::default();
    admin_config.listen_address = "127.0.0.1:8081".to_string();

    let mut config = ApplicationConfig::default();
    config.web.servers = [
        ("public".to_string(), public_config),
        ("admin".to_string(), admin_config),
    ]
    .into_iter()
    .collect();

    // apps are served by both servers, since AppController does not restrict server names
    let repository: Arc<AppRepositoryPtr> = Arc::new(InMemoryAppRepository::default());
    let controllers: Vec<ControllerPtr> = vec![
        Arc::new(AppController::new(repository)),
        Arc::new(HealthController),
    ];

    let server_runner = ServerRunner::new(
        config.web.clone(),
        RouterBootstrap::new(controllers),
        Arc::new(DefaultServerBootstrap),
        Arc::new(CtrlCShutdownSignalSource),
    );

    let mut application =
        Application::new(config, vec![Arc::new(server_runner) as ApplicationRunnerPtr]);

    // http://localhost:8081/health will respond with "OK", while http://localhost:8080/health
    // will respond with 404
    application.run().await.expect("error running application");
}
