use super::responses::ErrorResponse;
use crate::errors::RepositoryError;

use actix_web::{error::ResponseError, http::header::ContentType, http::StatusCode, HttpResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiResponseError {
    #[error(transparent)]
    ErrorBadRequest(#[from] RepositoryError),
    #[error(transparent)]
    ErrorBadUuid(#[from] uuid::Error),
}

impl ResponseError for ApiResponseError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ErrorResponse {
                error: self.to_string(),
            })
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiResponseError::ErrorBadRequest(RepositoryError::ExperimentNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiResponseError::ErrorBadRequest(RepositoryError::Policy(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiResponseError::ErrorBadUuid(_) => StatusCode::BAD_REQUEST,
        }
    }
}
