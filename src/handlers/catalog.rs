use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::models::{
    CreateHall, CreateMovie, CreateTheater, UpdateHall, UpdateMovie, UpdateTheater,
};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, success};

// Movies

pub async fn create_movie(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<CreateMovie>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let movie = state.catalog.create_movie(data).await?;
    Ok(created(movie, "Movie created"))
}

pub async fn list_movies(State(state): State<AppState>) -> Result<Response, AppError> {
    let movies = state.catalog.list_movies().await?;
    Ok(success(movies, "Movies retrieved"))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let movie = state.catalog.get_movie(id).await?;
    Ok(success(movie, "Movie retrieved"))
}

pub async fn update_movie(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateMovie>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let movie = state.catalog.update_movie(id, patch).await?;
    Ok(success(movie, "Movie updated"))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    state.catalog.delete_movie(id).await?;
    Ok(no_content())
}

// Theaters

pub async fn create_theater(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<CreateTheater>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let theater = state.catalog.create_theater(data).await?;
    Ok(created(theater, "Theater created"))
}

pub async fn list_theaters(State(state): State<AppState>) -> Result<Response, AppError> {
    let theaters = state.catalog.list_theaters().await?;
    Ok(success(theaters, "Theaters retrieved"))
}

pub async fn get_theater(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let theater = state.catalog.get_theater(id).await?;
    Ok(success(theater, "Theater retrieved"))
}

pub async fn update_theater(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateTheater>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let theater = state.catalog.update_theater(id, patch).await?;
    Ok(success(theater, "Theater updated"))
}

pub async fn delete_theater(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    state.catalog.delete_theater(id).await?;
    Ok(no_content())
}

// Halls

pub async fn create_hall(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<CreateHall>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let hall = state.catalog.create_hall(data).await?;
    Ok(created(hall, "Hall created"))
}

pub async fn list_halls(
    State(state): State<AppState>,
    Path(theater_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let halls = state.catalog.list_halls(theater_id).await?;
    Ok(success(halls, "Halls retrieved"))
}

pub async fn get_hall(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let hall = state.catalog.get_hall(id).await?;
    Ok(success(hall, "Hall retrieved"))
}

pub async fn update_hall(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateHall>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    let hall = state.catalog.update_hall(id, patch).await?;
    Ok(success(hall, "Hall updated"))
}

pub async fn delete_hall(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Staff).await?;
    state.catalog.delete_hall(id).await?;
    Ok(no_content())
}
