//! In-memory store for the *App* resource.
//!
//! An [App](model::App) is a small record identified by a server-generated id. Apps are created,
//! fetched, updated (fully or partially) and deleted through an
//! [AppRepository](repository::AppRepository). The default implementation,
//! [InMemoryAppRepository](repository::InMemoryAppRepository), keeps everything in a single map
//! guarded by a mutex, so it can be shared between concurrently running request handlers.
//!
//! ### Simple usage example
//!
//! ```
//! use appstore::model::{AppUpdateRequest, UpdateMode};
//! use appstore::repository::{AppRepository, InMemoryAppRepository};
//!
//! let repository = InMemoryAppRepository::default();
//!
//! let app = repository
//!     .create(AppUpdateRequest::new("hello", "world"))
//!     .expect("unable to create app");
//! assert_eq!(app.id, "1");
//!
//! // partial updates only touch fields which are present
//! let app = repository
//!     .update(
//!         &app.id,
//!         AppUpdateRequest {
//!             label: Some("goodbye".to_string()),
//!             description: None,
//!         },
//!         UpdateMode::Partial,
//!     )
//!     .expect("unable to update app");
//! assert_eq!(app.label, "goodbye");
//! assert_eq!(app.description, "world");
//! ```

pub mod error;
pub mod model;
pub mod repository;
