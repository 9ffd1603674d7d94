// Route exports
pub mod matches;

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use crate::models::ErrorResponse;
use crate::services::ServiceError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure),
    );
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::UnknownParticipant(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            ServiceError::Store(_) => "Storage failure",
            ServiceError::Input(_) => "Invalid preferences",
            ServiceError::UnknownParticipant(_) => "Unknown participant",
        };
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
