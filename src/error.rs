//! HTTP-facing error: a status code plus a `{ "error": ... }` JSON body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::users::{
    repo::UniqueField,
    services::{RegistrationError, ValidationReason},
};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(ValidationReason::MissingFields) => {
                Self::new(StatusCode::BAD_REQUEST, "Todos los campos son requeridos")
            }
            RegistrationError::Validation(ValidationReason::WeakPassword) => Self::new(
                StatusCode::BAD_REQUEST,
                "La contraseña debe tener al menos 8 caracteres",
            ),
            RegistrationError::Conflict(UniqueField::NationalId) => {
                Self::new(StatusCode::CONFLICT, "La cédula ya está registrada")
            }
            RegistrationError::Conflict(UniqueField::Email) => {
                Self::new(StatusCode::CONFLICT, "El email ya está registrado")
            }
            // cause already logged where it happened
            RegistrationError::Internal(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al registrar usuario",
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "malformed request body");
        Self::new(StatusCode::BAD_REQUEST, "Cuerpo de la solicitud inválido")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
