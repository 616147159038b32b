use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::models::{CreateScreening, UpdateScreening};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, success};

pub async fn create_screening(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<CreateScreening>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;

    let screening = state.scheduling.create(data).await?;

    Ok(created(screening, "Screening created"))
}

pub async fn list_screenings(State(state): State<AppState>) -> Result<Response, AppError> {
    let screenings = state.scheduling.list().await?;
    Ok(success(screenings, "Screenings retrieved"))
}

pub async fn get_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let screening = state.scheduling.get(id).await?;
    Ok(success(screening, "Screening retrieved"))
}

pub async fn update_screening(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateScreening>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;

    let screening = state.scheduling.update(id, patch).await?;

    Ok(success(screening, "Screening updated"))
}

pub async fn delete_screening(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;

    state.scheduling.delete(id).await?;

    Ok(no_content())
}
