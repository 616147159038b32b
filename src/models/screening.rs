use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Screening {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub hall_id: Uuid,
    pub starts_at: DateTime<Utc>,
    /// Persisted alongside `starts_at` so the overlap exclusion constraint
    /// can range over real columns.
    pub ends_at: DateTime<Utc>,
    pub duration: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateScreening {
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub hall_id: Uuid,
    pub starts_at: DateTime<Utc>,
    /// `HH:mm:ss`; falls back to the movie's default duration when omitted.
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScreening {
    pub movie_id: Option<Uuid>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration: Option<String>,
}
