use crate::prelude::{eprintln, *};
use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    routing::post,
    Form, Router,
};
use edx2gift_core::{convert_edx_to_gift, ConvertOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use super::auth::Credentials;

pub struct AppState {
    pub credentials: Credentials,
    pub options: ConvertOptions,
}

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    pub content: String,
}

pub async fn run_http(app: super::App, global: crate::Global) -> Result<()> {
    let addr = format!("{}:{}", app.host, app.port);

    let state = Arc::new(AppState {
        credentials: Credentials::new(app.username, app.password),
        options: ConvertOptions {
            title_mode: app.title_mode.into(),
            ..ConvertOptions::default()
        },
    });

    if let Some(dir) = &app.static_dir {
        if !dir.is_dir() {
            return Err(eyre!("Static directory {} does not exist", dir.display()));
        }
    }

    let app_router = router(state, app.static_dir.clone());

    if global.verbose {
        eprintln!("edx2gift listening on http://{}", addr);
        eprintln!("Convert endpoint: http://{}/convert", addr);
        if let Some(dir) = &app.static_dir {
            eprintln!("Serving static files from {}", dir.display());
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("listening on {addr}");

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/convert", post(convert_handler))
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Convert the `content` form field to GIFT.
///
/// Credentials are checked before the form is looked at.
async fn convert_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: std::result::Result<Form<ConvertForm>, FormRejection>,
) -> std::result::Result<String, Error> {
    let username = state.credentials.check(&headers).inspect_err(|err| {
        log::info!("rejected /convert request: {err}");
    })?;
    let Form(form) = form.map_err(Error::Form)?;

    let conversion = convert_edx_to_gift(&form.content, &state.options)?;
    crate::convert::log_warnings(&conversion);

    log::debug!(
        "converted {} questions for {username} ({} bytes in)",
        conversion.questions,
        form.content.len()
    );

    Ok(conversion.gift())
}
