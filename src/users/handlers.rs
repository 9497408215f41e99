use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{RegisterRequest, RegisterResponse},
        services::RegistrationService,
    },
};

pub fn register_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

#[instrument(skip(service, payload))]
pub async fn register(
    State(service): State<RegistrationService>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload?;
    let user = service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}
