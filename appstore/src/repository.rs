//! Storage for [App]s.

use crate::error::AppStoreError;
use crate::model::{App, AppUpdateRequest, UpdateMode};
use fxhash::FxHashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Repository of apps, shared between concurrently running handlers.
pub trait AppRepository {
    /// Returns the app with given id.
    fn get(&self, id: &str) -> Result<App, AppStoreError>;

    /// Creates a new app from a request with all fields present and assigns it a new id.
    fn create(&self, request: AppUpdateRequest) -> Result<App, AppStoreError>;

    /// Updates an existing app according to given [UpdateMode] and returns its new state.
    fn update(
        &self,
        id: &str,
        request: AppUpdateRequest,
        mode: UpdateMode,
    ) -> Result<App, AppStoreError>;

    /// Removes the app with given id, if present. Returns the removed app.
    fn delete(&self, id: &str) -> Option<App>;
}

pub type AppRepositoryPtr = dyn AppRepository + Send + Sync;

#[derive(Default, Debug)]
struct Store {
    apps: FxHashMap<String, App>,
    // number of apps ever created; unlike the map size, it never goes back after deletions
    created: u64,
}

/// [AppRepository] keeping all apps in memory. Every operation holds the lock for its whole
/// read-modify-write cycle.
#[derive(Default, Debug)]
pub struct InMemoryAppRepository {
    store: Mutex<Store>,
}

impl InMemoryAppRepository {
    fn lock(&self) -> MutexGuard<'_, Store> {
        // entries are plain values replaced in a single step, so a poisoned store is still valid
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppRepository for InMemoryAppRepository {
    fn get(&self, id: &str) -> Result<App, AppStoreError> {
        self.lock()
            .apps
            .get(id)
            .filter(|app| !app.id.is_empty())
            .cloned()
            .ok_or_else(|| AppStoreError::NotFound(id.to_string()))
    }

    fn create(&self, request: AppUpdateRequest) -> Result<App, AppStoreError> {
        let (label, description) = request.validate()?;

        let mut store = self.lock();
        store.created += 1;

        let app = App {
            id: store.created.to_string(),
            label,
            description,
        };

        debug!(id = %app.id, "Creating app.");

        store.apps.insert(app.id.clone(), app.clone());
        Ok(app)
    }

    fn update(
        &self,
        id: &str,
        request: AppUpdateRequest,
        mode: UpdateMode,
    ) -> Result<App, AppStoreError> {
        let mut store = self.lock();
        let app = store
            .apps
            .get_mut(id)
            .ok_or_else(|| AppStoreError::NotFound(id.to_string()))?;

        match mode {
            UpdateMode::Full => {
                let (label, description) = request.validate()?;
                app.label = label;
                app.description = description;
            }
            UpdateMode::Partial => request.apply_to(app),
        }

        debug!(id, ?mode, "Updated app.");

        Ok(app.clone())
    }

    fn delete(&self, id: &str) -> Option<App> {
        let removed = self.lock().apps.remove(id);
        debug!(id, existed = removed.is_some(), "Deleted app.");
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{AppStoreError, ValidationError};
    use crate::model::{App, AppUpdateRequest, UpdateMode};
    use crate::repository::{AppRepository, InMemoryAppRepository};
    use std::sync::Arc;
    use std::thread;

    fn partial(label: Option<&str>, description: Option<&str>) -> AppUpdateRequest {
        AppUpdateRequest {
            label: label.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn should_create_apps_with_sequential_ids() {
        let repository = InMemoryAppRepository::default();

        let first = repository.create(AppUpdateRequest::new("a", "b")).unwrap();
        let second = repository.create(AppUpdateRequest::new("c", "d")).unwrap();

        assert_eq!(
            first,
            App {
                id: "1".to_string(),
                label: "a".to_string(),
                description: "b".to_string(),
            }
        );
        assert_eq!(second.id, "2");
    }

    #[test]
    fn should_not_create_incomplete_app() {
        let repository = InMemoryAppRepository::default();

        assert_eq!(
            repository.create(partial(None, Some("d"))),
            Err(AppStoreError::Validation(ValidationError::MissingField(
                "Label"
            )))
        );
        assert_eq!(
            repository.create(partial(Some("l"), None)),
            Err(AppStoreError::Validation(ValidationError::MissingField(
                "Description"
            )))
        );

        // failed creations do not consume ids
        assert_eq!(
            repository.create(AppUpdateRequest::new("l", "d")).unwrap().id,
            "1"
        );
    }

    #[test]
    fn should_not_reuse_ids_after_deletion() {
        let repository = InMemoryAppRepository::default();
        repository.create(AppUpdateRequest::new("a", "a")).unwrap();
        repository.create(AppUpdateRequest::new("b", "b")).unwrap();

        assert!(repository.delete("1").is_some());

        let third = repository.create(AppUpdateRequest::new("c", "c")).unwrap();
        assert_eq!(third.id, "3");
        assert_eq!(repository.get("2").unwrap().label, "b");
    }

    #[test]
    fn should_get_created_app() {
        let repository = InMemoryAppRepository::default();
        let app = repository.create(AppUpdateRequest::new("l", "d")).unwrap();

        assert_eq!(repository.get(&app.id), Ok(app));
    }

    #[test]
    fn should_not_get_unknown_app() {
        let repository = InMemoryAppRepository::default();
        assert_eq!(
            repository.get("1"),
            Err(AppStoreError::NotFound("1".to_string()))
        );
    }

    #[test]
    fn should_fully_update_app() {
        let repository = InMemoryAppRepository::default();
        let app = repository.create(AppUpdateRequest::new("l", "d")).unwrap();

        let updated = repository
            .update(&app.id, AppUpdateRequest::new("l2", ""), UpdateMode::Full)
            .unwrap();

        assert_eq!(updated.id, app.id);
        assert_eq!(updated.label, "l2");
        assert_eq!(updated.description, "");
        assert_eq!(repository.get(&app.id), Ok(updated));
    }

    #[test]
    fn should_not_fully_update_with_incomplete_request() {
        let repository = InMemoryAppRepository::default();
        let app = repository.create(AppUpdateRequest::new("l", "d")).unwrap();

        assert_eq!(
            repository.update(&app.id, partial(Some("l2"), None), UpdateMode::Full),
            Err(AppStoreError::Validation(ValidationError::MissingField(
                "Description"
            )))
        );
        assert_eq!(repository.get(&app.id), Ok(app));
    }

    #[test]
    fn should_partially_update_app() {
        let repository = InMemoryAppRepository::default();
        let app = repository.create(AppUpdateRequest::new("l", "d")).unwrap();

        let updated = repository
            .update(&app.id, partial(Some("l2"), None), UpdateMode::Partial)
            .unwrap();

        assert_eq!(updated.label, "l2");
        assert_eq!(updated.description, "d");
    }

    #[test]
    fn should_report_missing_app_before_validation() {
        let repository = InMemoryAppRepository::default();

        assert_eq!(
            repository.update("7", AppUpdateRequest::default(), UpdateMode::Full),
            Err(AppStoreError::NotFound("7".to_string()))
        );
        assert_eq!(
            repository.update("7", AppUpdateRequest::default(), UpdateMode::Partial),
            Err(AppStoreError::NotFound("7".to_string()))
        );
    }

    #[test]
    fn should_delete_idempotently() {
        let repository = InMemoryAppRepository::default();
        let app = repository.create(AppUpdateRequest::new("l", "d")).unwrap();

        assert_eq!(repository.delete(&app.id), Some(app.clone()));
        assert_eq!(repository.delete(&app.id), None);
        assert!(repository.get(&app.id).is_err());
    }

    #[test]
    fn should_assign_unique_ids_concurrently() {
        let repository = Arc::new(InMemoryAppRepository::default());

        let handles = (0..8)
            .map(|_| {
                let repository = repository.clone();
                thread::spawn(move || {
                    (0..50)
                        .map(|_| {
                            repository
                                .create(AppUpdateRequest::new("l", "d"))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let mut ids = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 400);
    }
}
