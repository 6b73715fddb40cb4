//! Controller routing handling. Routing is based on gathering registered controllers and their
//! request handlers.

use crate::controller::ControllerPtr;
use axum::Router;
use derive_more::Constructor;
use tower_http::trace::TraceLayer;

/// Creates a [Router] for a given server out of registered [Controller](crate::controller::Controller)s.
#[derive(Constructor, Clone)]
pub struct RouterBootstrap {
    controllers: Vec<ControllerPtr>,
}

impl RouterBootstrap {
    /// Creates a new [Router] containing routes of all controllers applicable to given server.
    pub fn bootstrap_router(&self, server_name: &str) -> Router {
        self.controllers
            .iter()
            .filter(|controller| {
                controller
                    .server_names()
                    .map(|server_names| server_names.contains(server_name))
                    .unwrap_or(true)
            })
            .fold(Router::new(), |router, controller| {
                controller.configure_router(router)
            })
            .layer(TraceLayer::new_for_http())
    }
}
