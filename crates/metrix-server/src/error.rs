//! HTTP mapping for `MetrixError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use metrix_core::error::{ClientCode, MetrixError};

/// Handler error; renders as a plain-text body with the mapped status.
#[derive(Debug)]
pub struct ApiError(pub MetrixError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<MetrixError> for ApiError {
    fn from(e: MetrixError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Unavailable | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::warn!(code = code.as_str(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self.0, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
