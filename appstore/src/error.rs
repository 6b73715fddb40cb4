use thiserror::Error;

/// Errors resulting from checking an [AppUpdateRequest](crate::model::AppUpdateRequest) against
/// the requirements of a full update.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValidationError {
    #[error("{0} must be present.")]
    MissingField(&'static str),
}

/// Errors related to managing apps in a repository.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AppStoreError {
    #[error("App could not be found.")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
