use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::models::{Booking, CreateBooking, SeatReservation, UpdateBooking};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, success};

#[derive(Serialize)]
pub struct BookingPayload {
    pub booking: Booking,
    pub seats: Vec<SeatReservation>,
}

/// Owners may touch their own bookings; anyone else needs staff.
async fn authorize_owner_or_staff(
    state: &AppState,
    identity: &Identity,
    owner_id: Uuid,
) -> Result<(), AppError> {
    if identity.id == owner_id {
        state.roles.require_role(identity, Role::Basic).await?;
    } else {
        state.roles.require_role(identity, Role::Staff).await?;
    }
    Ok(())
}

pub async fn create_booking(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<CreateBooking>,
) -> Result<Response, AppError> {
    state.roles.require_role(&identity, Role::Basic).await?;

    let (booking, seats) = state.bookings.create(identity.id, data).await?;

    Ok(created(
        BookingPayload { booking, seats },
        "Booking created",
    ))
}

pub async fn list_bookings(State(state): State<AppState>) -> Result<Response, AppError> {
    let bookings = state.bookings.list().await?;
    Ok(success(bookings, "Bookings retrieved"))
}

pub async fn list_my_bookings(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, AppError> {
    let bookings = state.bookings.list_for_user(identity.id).await?;
    Ok(success(bookings, "Bookings retrieved"))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (booking, seats) = state.bookings.get(id).await?;
    Ok(success(BookingPayload { booking, seats }, "Booking retrieved"))
}

pub async fn update_booking(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateBooking>,
) -> Result<Response, AppError> {
    let (existing, _) = state.bookings.get(id).await?;
    authorize_owner_or_staff(&state, &identity, existing.user_id).await?;

    let (booking, seats) = state.bookings.update(id, patch).await?;

    Ok(success(BookingPayload { booking, seats }, "Booking updated"))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (existing, _) = state.bookings.get(id).await?;
    authorize_owner_or_staff(&state, &identity, existing.user_id).await?;

    state.bookings.delete(id).await?;

    Ok(no_content())
}

pub async fn mark_booking_used(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    // Ticket validation at the door is a staff action.
    state.roles.require_role(&identity, Role::Staff).await?;

    let booking = state.bookings.mark_used(id).await?;

    Ok(success(booking, "Booking marked as used"))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (existing, _) = state.bookings.get(id).await?;
    authorize_owner_or_staff(&state, &identity, existing.user_id).await?;

    let booking = state.bookings.cancel(id).await?;

    Ok(success(booking, "Booking canceled"))
}
