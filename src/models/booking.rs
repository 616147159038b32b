use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Used,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub screening_id: Uuid,
    pub seats_number: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One claimed seat. The `(screening_id, seat_id)` pair is unique across the
/// whole store; `booking_id` ties the row to its owning booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatReservation {
    pub screening_id: Uuid,
    pub seat_id: String,
    pub booking_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBooking {
    pub screening_id: Uuid,
    pub seats_number: i32,
    pub seat_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBooking {
    /// Replacement seat set; re-validated and re-reserved atomically.
    pub seat_ids: Option<Vec<String>>,
}
