//! Runners executing actual application logic.

pub use futures::future::{BoxFuture, FutureExt};
#[cfg(test)]
use mockall::automock;
use std::error::Error;
use std::sync::Arc;

/// Type-erased error passed between runners and the [Application](crate::application::Application).
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

pub type ApplicationRunnerPtr = Arc<dyn ApplicationRunner + Send + Sync>;

/// Runs application logic. Runners are run by the [Application](crate::application::Application)
/// in order of their priority.
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> BoxFuture<'_, Result<(), ErrorPtr>>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
