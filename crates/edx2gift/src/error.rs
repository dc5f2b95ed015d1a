use axum::extract::rejection::FormRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failures of an HTTP conversion request.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid authentication credentials")]
    MalformedCredentials,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid form: {0}")]
    Form(FormRejection),

    #[error("{0}")]
    Conversion(#[from] edx2gift_core::ConvertError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let detail = serde_json::json!({ "detail": self.to_string() });

        match self {
            Error::NotAuthenticated | Error::MalformedCredentials | Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic")],
                Json(detail),
            )
                .into_response(),
            Error::Form(rejection) => rejection.into_response(),
            Error::Conversion(_) => (StatusCode::BAD_REQUEST, Json(detail)).into_response(),
        }
    }
}
