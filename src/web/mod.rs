//! HTTP surface: the typed error taxonomy mapped onto status codes, the
//! `{ success, ... }` response envelopes, and the axum router.

pub mod routes;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::core::PlanError;

pub use routes::{AppState, app};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<DataResponse<T>>) {
    (
        StatusCode::OK,
        Json(DataResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<DataResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(DataResponse {
            success: true,
            data,
        }),
    )
}

#[derive(Debug)]
pub struct WebError(pub PlanError);

impl From<PlanError> for WebError {
    fn from(err: PlanError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            PlanError::InvalidObjectId(_)
            | PlanError::InvalidCollectionType(_)
            | PlanError::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            PlanError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            PlanError::CascadeFailure { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "cascade_failure")
            }
            PlanError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.0.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type WebResult<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, EntityType};
    use axum::http::StatusCode;

    fn status_of(err: PlanError) -> StatusCode {
        WebError(err).into_response().status()
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        assert_eq!(
            status_of(PlanError::InvalidObjectId("jane".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PlanError::InvalidCollectionType("Airline".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let id = EntityId::generate();
        assert_eq!(
            status_of(PlanError::not_found(EntityType::Planner, &id)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_cascade_failure_maps_to_500() {
        let id = EntityId::generate();
        let err = PlanError::CascadeFailure {
            kind: EntityType::Destination,
            id,
            reason: "store went away".into(),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
