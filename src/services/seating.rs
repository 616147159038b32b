//! Seat layout resolution and availability checks.
//!
//! Both checks take a `PgConnection` so the booking coordinator can run them
//! on the same transaction that performs the eventual insert.

use std::collections::HashSet;

use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::hall::SeatGrid;
use crate::utils::error::AppError;

/// Flattens a hall grid into the set of addressable seat ids. `None` cells
/// are gaps; an empty string never names a seat.
pub fn valid_seats(grid: &SeatGrid) -> HashSet<String> {
    grid.iter()
        .flatten()
        .filter_map(|cell| cell.as_deref())
        .filter(|seat| !seat.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns a seat id that appears more than once in the grid, if any. Used
/// when a hall layout is created or replaced.
pub fn duplicate_seat(grid: &SeatGrid) -> Option<String> {
    let mut seen = HashSet::new();
    grid.iter()
        .flatten()
        .filter_map(|cell| cell.as_deref())
        .filter(|seat| !seat.is_empty())
        .find(|seat| !seen.insert(seat.to_string()))
        .map(str::to_string)
}

fn first_unknown_seat<'a>(valid: &HashSet<String>, requested: &'a [String]) -> Option<&'a str> {
    requested
        .iter()
        .map(String::as_str)
        .find(|seat| !valid.contains(*seat))
}

/// Verifies every requested seat id exists in the screening's hall layout.
/// Trivially succeeds on empty input so bulk call sites compose freely.
pub async fn check_seats_exist(
    conn: &mut PgConnection,
    screening_id: Uuid,
    seat_ids: &[String],
) -> Result<(), AppError> {
    if seat_ids.is_empty() {
        return Ok(());
    }

    let hall_id = sqlx::query_scalar::<_, Uuid>("SELECT hall_id FROM screenings WHERE id = $1")
        .bind(screening_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Screening '{}' was not found", screening_id)))?;

    let grid = sqlx::query_scalar::<_, Json<SeatGrid>>("SELECT seat_grid FROM halls WHERE id = $1")
        .bind(hall_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Hall '{}' was not found", hall_id)))?;

    let valid = valid_seats(&grid);
    if let Some(seat) = first_unknown_seat(&valid, seat_ids) {
        return Err(AppError::ValidationError(format!(
            "Seat '{}' does not exist in this hall",
            seat
        )));
    }

    Ok(())
}

/// Advisory availability check. Reports every already-reserved seat in the
/// request, not just the first; the storage-level primary key remains the
/// authoritative arbiter under concurrency.
pub async fn check_seats_available(
    conn: &mut PgConnection,
    screening_id: Uuid,
    seat_ids: &[String],
) -> Result<(), AppError> {
    if seat_ids.is_empty() {
        return Ok(());
    }

    let taken = sqlx::query_scalar::<_, String>(
        "SELECT seat_id FROM seat_reservations
         WHERE screening_id = $1 AND seat_id = ANY($2)
         ORDER BY seat_id",
    )
    .bind(screening_id)
    .bind(seat_ids)
    .fetch_all(&mut *conn)
    .await?;

    if taken.is_empty() {
        Ok(())
    } else {
        Err(AppError::SeatConflict(taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[Option<&str>]]) -> SeatGrid {
        rows.iter()
            .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
            .collect()
    }

    #[test]
    fn gaps_are_not_seats() {
        let layout = grid(&[
            &[Some("A1"), Some("A2"), None],
            &[None, Some("B1"), Some("")],
        ]);

        let seats = valid_seats(&layout);
        assert_eq!(seats.len(), 3);
        assert!(seats.contains("A1"));
        assert!(seats.contains("A2"));
        assert!(seats.contains("B1"));
        assert!(!seats.contains(""));
    }

    #[test]
    fn empty_grid_has_no_seats() {
        assert!(valid_seats(&grid(&[])).is_empty());
        assert!(valid_seats(&grid(&[&[None, None]])).is_empty());
    }

    #[test]
    fn duplicate_detection_ignores_gaps() {
        let clean = grid(&[&[Some("A1"), None], &[None, Some("A2")]]);
        assert_eq!(duplicate_seat(&clean), None);

        let dup = grid(&[&[Some("A1"), Some("A2")], &[Some("A1"), None]]);
        assert_eq!(duplicate_seat(&dup), Some("A1".to_string()));
    }

    #[test]
    fn first_unknown_seat_reports_in_request_order() {
        let layout = grid(&[&[Some("A1"), Some("A2")]]);
        let valid = valid_seats(&layout);

        let requested = vec!["A2".to_string(), "Z9".to_string(), "Z8".to_string()];
        assert_eq!(first_unknown_seat(&valid, &requested), Some("Z9"));

        let all_known = vec!["A1".to_string(), "A2".to_string()];
        assert_eq!(first_unknown_seat(&valid, &all_known), None);
    }
}
