use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::auth::Identity;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod bookings;
pub mod catalog;
pub mod screenings;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "marquee-api",
    };

    success(payload, "Health check successful")
}

/// The caller's own user record, as the role store knows it.
pub async fn me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, AppError> {
    let user = state
        .roles
        .get_user(identity.id)
        .await?
        .ok_or_else(|| AppError::AuthError("Unknown caller identity".to_string()))?;

    Ok(success(user, "User retrieved"))
}
