//! Functionality related to defining [Controller]s - collections of web handlers contributing
//! routes to a server.

use crate::error::ApiError;
use crate::negotiation::{Accepted, Encoded, Negotiated};
use appstore::model::{App, AppUpdateRequest, UpdateMode};
use appstore::repository::AppRepositoryPtr;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use derive_more::Constructor;
use fxhash::FxHashSet;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::debug;

pub type ControllerPtr = Arc<dyn Controller + Send + Sync>;

/// Main trait for controllers. A controller adds its routes to a [Router] and can restrict
/// itself to a subset of configured servers.
#[cfg_attr(test, automock)]
pub trait Controller {
    /// Adds routes handled by this controller.
    fn configure_router(&self, router: Router) -> Router;

    /// Names of servers this controller should be registered in. `None` means all servers.
    fn server_names(&self) -> Option<FxHashSet<String>> {
        None
    }
}

/// Controller managing [App]s under `/apps`.
#[derive(Constructor)]
pub struct AppController {
    repository: Arc<AppRepositoryPtr>,
}

impl Controller for AppController {
    fn configure_router(&self, router: Router) -> Router {
        let routes: Router = Router::new()
            .route("/apps", post(create_app))
            .route(
                "/apps/:app_id",
                get(find_app)
                    .put(update_app)
                    .patch(patch_app)
                    .delete(remove_app),
            )
            .with_state(self.repository.clone());

        router.merge(routes)
    }
}

type Repository = State<Arc<AppRepositoryPtr>>;

// GET /apps/{app-id}
async fn find_app(
    State(repository): Repository,
    accepted: Accepted,
    Path(app_id): Path<String>,
) -> Result<Encoded<App>, ApiError> {
    debug!(%app_id, "Finding app.");

    let app = repository.get(&app_id)?;
    Ok(Encoded::new(accepted, app))
}

// POST /apps
async fn create_app(
    State(repository): Repository,
    accepted: Accepted,
    Negotiated(request): Negotiated<AppUpdateRequest>,
) -> Result<(StatusCode, Encoded<App>), ApiError> {
    let app = repository.create(request)?;
    debug!(app_id = %app.id, "Created app.");

    Ok((StatusCode::CREATED, Encoded::new(accepted, app)))
}

// PUT /apps/{app-id}
async fn update_app(
    State(repository): Repository,
    accepted: Accepted,
    Path(app_id): Path<String>,
    body: Result<Negotiated<AppUpdateRequest>, ApiError>,
) -> Result<Encoded<App>, ApiError> {
    let app = apply_update(repository.as_ref(), &app_id, body, UpdateMode::Full)?;
    Ok(Encoded::new(accepted, app))
}

// PATCH /apps/{app-id}
async fn patch_app(
    State(repository): Repository,
    accepted: Accepted,
    Path(app_id): Path<String>,
    body: Result<Negotiated<AppUpdateRequest>, ApiError>,
) -> Result<Encoded<App>, ApiError> {
    let app = apply_update(repository.as_ref(), &app_id, body, UpdateMode::Partial)?;
    Ok(Encoded::new(accepted, app))
}

fn apply_update(
    repository: &AppRepositoryPtr,
    app_id: &str,
    body: Result<Negotiated<AppUpdateRequest>, ApiError>,
    mode: UpdateMode,
) -> Result<App, ApiError> {
    let request = match body {
        Ok(Negotiated(request)) => request,
        Err(error) => {
            // an unknown id takes precedence over an unreadable body
            repository.get(app_id)?;
            return Err(error);
        }
    };

    debug!(app_id, ?mode, "Updating app.");
    Ok(repository.update(app_id, request, mode)?)
}

// DELETE /apps/{app-id}
async fn remove_app(State(repository): Repository, Path(app_id): Path<String>) -> StatusCode {
    repository.delete(&app_id);
    StatusCode::OK
}
