use crate::error::Error;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub(crate) struct APIError(anyhow::Error);

impl APIError {
    // Malformed request parameters are reported like any other parameter error.
    fn into_error(self) -> Result<Error, anyhow::Error> {
        let any_err = match self.0.downcast::<Error>() {
            Ok(err) => return Ok(err),
            Err(any_err) => any_err,
        };
        if let Some(rejection) = any_err.downcast_ref::<QueryRejection>() {
            return Ok(Error::Parameter(rejection.body_text()));
        }
        if let Some(rejection) = any_err.downcast_ref::<PathRejection>() {
            return Ok(Error::Parameter(rejection.body_text()));
        }
        Err(any_err)
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        match self.into_error() {
            Ok(err) => {
                let kind = err.kind();
                tracing::warn!("rejected request: {kind}: {err}");
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, format!("{kind}: {err}\n")).into_response()
            }
            Err(any_err) => {
                tracing::error!("request failed: {any_err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("INTERNAL_ERROR: {any_err}\n"),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
