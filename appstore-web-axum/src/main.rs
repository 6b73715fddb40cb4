use appstore_web_axum::application::{self, ApplicationError};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    let mut application = application::create_default()?;
    application.run().await
}
