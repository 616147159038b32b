use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Rectangular seating plan. `None` marks a gap (aisle, pillar, missing
/// seat); every `Some` cell is an addressable seat id, unique per hall.
pub type SeatGrid = Vec<Vec<Option<String>>>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hall {
    pub id: Uuid,
    pub theater_id: Uuid,
    pub name: String,
    pub seat_grid: Json<SeatGrid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHall {
    pub theater_id: Uuid,
    pub name: String,
    pub seat_grid: SeatGrid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHall {
    pub name: Option<String>,
    pub seat_grid: Option<SeatGrid>,
}
