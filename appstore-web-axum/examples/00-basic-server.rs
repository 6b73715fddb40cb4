use appstore_web_axum::application;

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
#[tokio::main]
async fn main() {
    // configuration is read from `appstore.json` and `APPSTORE_` environment variables - by
    // default, a single server listens on 0.0.0.0:8080
    let mut application = application::create_default().expect("unable to create application");

    // try:
    // curl -i -X POST localhost:8080/apps -H 'content-type: application/json' \
    //     -d '{"label": "hello", "description": "world"}'
    // curl -i localhost:8080/apps/1 -H 'accept: application/xml'
    application.run().await.expect("error running application");
}
