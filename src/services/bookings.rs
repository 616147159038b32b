//! Booking creation, mutation, and lifecycle transitions.
//!
//! Every mutating call runs inside a single transaction: either the booking
//! row and all of its seat reservations commit together, or nothing does.
//! The advisory seat checks run on the transaction connection; the composite
//! primary key on `seat_reservations` breaks ties between concurrent callers,
//! and the losing insert is reported as a seat conflict.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, CreateBooking, SeatReservation, UpdateBooking};
use crate::services::seating;
use crate::utils::error::AppError;

/// Seat list shape checks shared by create and re-seat.
fn validate_seat_request(seats_number: i32, seat_ids: &[String]) -> Result<(), AppError> {
    if seat_ids.is_empty() {
        return Err(AppError::ValidationError(
            "At least one seat must be requested".to_string(),
        ));
    }
    if seat_ids.len() != seats_number as usize {
        return Err(AppError::ValidationError(format!(
            "seats_number is {} but {} seat ids were given",
            seats_number,
            seat_ids.len()
        )));
    }
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        data: CreateBooking,
    ) -> Result<(Booking, Vec<SeatReservation>), AppError> {
        let mut tx = self.pool.begin().await?;
        match Self::create_in_tx(&mut tx, user_id, &data).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result)
            }
            Err(err) => Self::rolled_back(tx, err).await,
        }
    }

    async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        data: &CreateBooking,
    ) -> Result<(Booking, Vec<SeatReservation>), AppError> {
        validate_seat_request(data.seats_number, &data.seat_ids)?;

        seating::check_seats_exist(&mut *tx, data.screening_id, &data.seat_ids).await?;
        seating::check_seats_available(&mut *tx, data.screening_id, &data.seat_ids).await?;

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, screening_id, seats_number, status)
             VALUES ($1, $2, $3, $4, 'pending')
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.screening_id)
        .bind(data.seats_number)
        .fetch_one(&mut **tx)
        .await?;

        let seats = Self::reserve_seats(tx, data.screening_id, booking.id, &data.seat_ids).await?;

        Ok((booking, seats))
    }

    async fn reserve_seats(
        tx: &mut Transaction<'_, Postgres>,
        screening_id: Uuid,
        booking_id: Uuid,
        seat_ids: &[String],
    ) -> Result<Vec<SeatReservation>, AppError> {
        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let reservation = sqlx::query_as::<_, SeatReservation>(
                "INSERT INTO seat_reservations (screening_id, seat_id, booking_id)
                 VALUES ($1, $2, $3)
                 RETURNING *",
            )
            .bind(screening_id)
            .bind(seat_id)
            .bind(booking_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                // The advisory check passed but another transaction committed
                // this seat first; the primary key decides who wins.
                if is_unique_violation(&e) {
                    AppError::SeatConflict(vec![seat_id.clone()])
                } else {
                    e.into()
                }
            })?;
            seats.push(reservation);
        }

        Ok(seats)
    }

    /// Replaces a booking's seat set atomically: old reservations out, new
    /// ones validated and in, `seats_number` kept in step.
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateBooking,
    ) -> Result<(Booking, Vec<SeatReservation>), AppError> {
        let mut tx = self.pool.begin().await?;
        match Self::update_in_tx(&mut tx, id, patch).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result)
            }
            Err(err) => Self::rolled_back(tx, err).await,
        }
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        patch: UpdateBooking,
    ) -> Result<(Booking, Vec<SeatReservation>), AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", id)))?;

        let Some(seat_ids) = patch.seat_ids else {
            let seats = Self::seats_of(tx, id).await?;
            return Ok((booking, seats));
        };

        if seat_ids.is_empty() {
            return Err(AppError::ValidationError(
                "At least one seat must be requested".to_string(),
            ));
        }

        seating::check_seats_exist(&mut *tx, booking.screening_id, &seat_ids).await?;

        // Release this booking's own seats before the availability check so a
        // re-seat overlapping the current set does not conflict with itself.
        sqlx::query("DELETE FROM seat_reservations WHERE booking_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        seating::check_seats_available(&mut *tx, booking.screening_id, &seat_ids).await?;

        let seats = Self::reserve_seats(tx, booking.screening_id, id, &seat_ids).await?;

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET seats_number = $2, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(seats.len() as i32)
        .fetch_one(&mut **tx)
        .await?;

        Ok((booking, seats))
    }

    /// Deletes the booking and every seat reservation it owns.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = async {
            sqlx::query("DELETE FROM seat_reservations WHERE booking_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query_scalar::<_, Uuid>("DELETE FROM bookings WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", id)))?;

            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => Self::rolled_back(tx, err).await,
        }
    }

    pub async fn mark_used(&self, id: Uuid) -> Result<Booking, AppError> {
        self.transition(id, BookingStatus::Used).await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Booking, AppError> {
        self.transition(id, BookingStatus::Canceled).await
    }

    /// `pending` is the only state a booking may leave. A transition attempt
    /// on a used or canceled booking is a conflict, never a silent rewrite.
    async fn transition(&self, id: Uuid, to: BookingStatus) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = async {
            let updated = sqlx::query_as::<_, Booking>(
                "UPDATE bookings SET status = $2, updated_at = now()
                 WHERE id = $1 AND status = 'pending'
                 RETURNING *",
            )
            .bind(id)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(booking) = updated {
                return Ok(booking);
            }

            let current = sqlx::query_scalar::<_, BookingStatus>(
                "SELECT status FROM bookings WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            match current {
                None => Err(AppError::NotFound(format!("Booking '{}' was not found", id))),
                Some(status) => Err(AppError::StatusConflict(format!(
                    "booking '{}' is already {:?}",
                    id, status
                ))),
            }
        }
        .await;

        match result {
            Ok(booking) => {
                tx.commit().await?;
                Ok(booking)
            }
            Err(err) => Self::rolled_back(tx, err).await,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<(Booking, Vec<SeatReservation>), AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", id)))?;

        let seats = sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE booking_id = $1 ORDER BY seat_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok((booking, seats))
    }

    pub async fn list(&self) -> Result<Vec<Booking>, AppError> {
        let bookings =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(bookings)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn seats_of(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<Vec<SeatReservation>, AppError> {
        let seats = sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE booking_id = $1 ORDER BY seat_id",
        )
        .bind(booking_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(seats)
    }

    /// Rolls the transaction back and re-raises the original error. A failed
    /// rollback is logged but never replaces it.
    async fn rolled_back<T>(
        tx: Transaction<'_, Postgres>,
        err: AppError,
    ) -> Result<T, AppError> {
        if let Err(rollback_err) = tx.rollback().await {
            warn!(error = ?rollback_err, "Transaction rollback failed");
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_seat_list_is_rejected() {
        assert!(validate_seat_request(0, &[]).is_err());
        assert!(validate_seat_request(2, &[]).is_err());
    }

    #[test]
    fn seat_count_must_match_the_list() {
        assert!(validate_seat_request(2, &seats(&["A1"])).is_err());
        assert!(validate_seat_request(1, &seats(&["A1", "A2"])).is_err());
    }

    #[test]
    fn matching_count_passes() {
        assert!(validate_seat_request(2, &seats(&["A1", "A2"])).is_ok());
        assert!(validate_seat_request(1, &seats(&["A1"])).is_ok());
    }
}
