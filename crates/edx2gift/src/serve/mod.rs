mod auth;
mod cli;
mod http;

pub use cli::App;

use crate::prelude::*;

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    http::run_http(app, global).await
}
