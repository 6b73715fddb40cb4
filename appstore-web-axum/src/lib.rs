//! REST surface for the [appstore] App resource, based on axum.
//!
//! Apps are exposed under `/apps` by an [AppController](controller::AppController), which is one
//! of possibly many [Controllers](controller::Controller) contributing routes to configured
//! servers. Request and response bodies can be either JSON or XML, depending on the `Content-Type`
//! and `Accept` headers.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | `GET` | `/apps/{app-id}` | `200` with the app |
//! | `POST` | `/apps` | `201` with the created app |
//! | `PUT` | `/apps/{app-id}` | `200` with the updated app |
//! | `PATCH` | `/apps/{app-id}` | `200` with the updated app |
//! | `DELETE` | `/apps/{app-id}` | `200` with an empty body |
//!
//! ### Simple usage example
//!
//! ```no_run
//! use appstore_web_axum::application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), application::ApplicationError> {
//!     // run the server with configuration from `appstore.json` and the environment, until
//!     // Ctrl-C is pressed
//!     application::create_default()?.run().await
//! }
//! ```

pub mod application;
pub mod config;
pub mod controller;
pub mod error;
pub mod negotiation;
pub mod router;
pub mod runner;
pub mod server;

pub use axum;
