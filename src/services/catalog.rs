//! Movie, theater, and hall CRUD. Ordinary plumbing, but the hall layout
//! validation here is what keeps the seat resolver's uniqueness assumption
//! true.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::hall::SeatGrid;
use crate::models::{
    CreateHall, CreateMovie, CreateTheater, Hall, Movie, Theater, UpdateHall, UpdateMovie,
    UpdateTheater,
};
use crate::services::scheduling::parse_duration;
use crate::services::seating;
use crate::utils::error::AppError;

fn validate_grid(grid: &SeatGrid) -> Result<(), AppError> {
    if seating::valid_seats(grid).is_empty() {
        return Err(AppError::ValidationError(
            "Hall layout must contain at least one seat".to_string(),
        ));
    }
    if let Some(seat) = seating::duplicate_seat(grid) {
        return Err(AppError::ValidationError(format!(
            "Seat '{}' appears more than once in the hall layout",
            seat
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Movies

    pub async fn create_movie(&self, data: CreateMovie) -> Result<Movie, AppError> {
        parse_duration(&data.duration)?;

        let movie = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, description, duration)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(movie)
    }

    pub async fn get_movie(&self, id: Uuid) -> Result<Movie, AppError> {
        sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' was not found", id)))
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(movies)
    }

    pub async fn update_movie(&self, id: Uuid, patch: UpdateMovie) -> Result<Movie, AppError> {
        if let Some(duration) = &patch.duration {
            parse_duration(duration)?;
        }

        sqlx::query_as::<_, Movie>(
            "UPDATE movies
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 duration = COALESCE($4, duration),
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.duration)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie '{}' was not found", id)))
    }

    pub async fn delete_movie(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_row("movies", "Movie", id).await
    }

    // Theaters

    pub async fn create_theater(&self, data: CreateTheater) -> Result<Theater, AppError> {
        let theater = sqlx::query_as::<_, Theater>(
            "INSERT INTO theaters (name, location) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(theater)
    }

    pub async fn get_theater(&self, id: Uuid) -> Result<Theater, AppError> {
        sqlx::query_as::<_, Theater>("SELECT * FROM theaters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theater '{}' was not found", id)))
    }

    pub async fn list_theaters(&self) -> Result<Vec<Theater>, AppError> {
        let theaters = sqlx::query_as::<_, Theater>("SELECT * FROM theaters ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(theaters)
    }

    pub async fn update_theater(
        &self,
        id: Uuid,
        patch: UpdateTheater,
    ) -> Result<Theater, AppError> {
        sqlx::query_as::<_, Theater>(
            "UPDATE theaters
             SET name = COALESCE($2, name),
                 location = COALESCE($3, location),
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.location)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Theater '{}' was not found", id)))
    }

    pub async fn delete_theater(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_row("theaters", "Theater", id).await
    }

    // Halls

    pub async fn create_hall(&self, data: CreateHall) -> Result<Hall, AppError> {
        validate_grid(&data.seat_grid)?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM theaters WHERE id = $1")
            .bind(data.theater_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Theater '{}' was not found", data.theater_id))
            })?;

        let hall = sqlx::query_as::<_, Hall>(
            "INSERT INTO halls (theater_id, name, seat_grid)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(data.theater_id)
        .bind(&data.name)
        .bind(Json(&data.seat_grid))
        .fetch_one(&self.pool)
        .await?;

        Ok(hall)
    }

    pub async fn get_hall(&self, id: Uuid) -> Result<Hall, AppError> {
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hall '{}' was not found", id)))
    }

    pub async fn list_halls(&self, theater_id: Uuid) -> Result<Vec<Hall>, AppError> {
        let halls =
            sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE theater_id = $1 ORDER BY name")
                .bind(theater_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(halls)
    }

    pub async fn update_hall(&self, id: Uuid, patch: UpdateHall) -> Result<Hall, AppError> {
        if let Some(grid) = &patch.seat_grid {
            validate_grid(grid)?;
        }

        sqlx::query_as::<_, Hall>(
            "UPDATE halls
             SET name = COALESCE($2, name),
                 seat_grid = COALESCE($3, seat_grid),
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.seat_grid.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Hall '{}' was not found", id)))
    }

    pub async fn delete_hall(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_row("halls", "Hall", id).await
    }

    async fn delete_row(&self, table: &str, entity: &str, id: Uuid) -> Result<(), AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1 RETURNING id", table);
        let deleted = sqlx::query_scalar::<_, Uuid>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::ValidationError(format!(
                        "{} is still referenced and cannot be deleted",
                        entity
                    ))
                }
                _ => e.into(),
            })?;

        if deleted.is_none() {
            return Err(AppError::NotFound(format!("{} '{}' was not found", entity, id)));
        }

        Ok(())
    }
}
