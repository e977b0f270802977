//! HTTP error type and its JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use impostor_runtime::RuntimeError;
use serde::{Deserialize, Serialize};

/// Code for request bodies or queries that fail to parse.
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Wire-format error body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
    /// Machine-readable code, e.g. `SESSION_NOT_FOUND`.
    pub code: String,
}

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body or query could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Registry rejected the operation.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Runtime(e) => match e {
                RuntimeError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                RuntimeError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RuntimeError::AlreadyResolved(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> String {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST.to_owned(),
            Self::Runtime(e) => e.category().to_ascii_uppercase(),
        }
    }

    /// Convert to the wire-format body.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            detail: self.to_string(),
            code: self.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impostor_core::{SessionId, SimulationError};
    use std::time::Duration;

    const S: SessionId = SessionId::new(3);

    #[test]
    fn unknown_session_is_404() {
        let err = ApiError::from(RuntimeError::SessionNotFound(S));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "SESSION_NOT_FOUND");
        assert_eq!(err.to_error_body().detail, "Unknown game_id=3");
    }

    #[test]
    fn out_of_range_is_422() {
        let err = ApiError::from(RuntimeError::OutOfRange {
            index: 99,
            available: 4,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "OUT_OF_RANGE");
    }

    #[test]
    fn already_resolved_is_409() {
        let err = ApiError::from(RuntimeError::AlreadyResolved(S));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn everything_else_is_400() {
        for err in [
            RuntimeError::NotWaiting(S),
            RuntimeError::NoHumanActor(S),
            RuntimeError::ReadinessTimeout {
                session_id: S,
                timeout: Duration::from_secs(10),
            },
            RuntimeError::Simulation(SimulationError::InvalidConfig("no seats".into())),
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn invalid_request_code() {
        let err = ApiError::InvalidRequest("missing field `game_id`".into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), INVALID_REQUEST);
    }
}
