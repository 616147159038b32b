//! Screening scheduling with hall-overlap protection.
//!
//! Overlap is guarded twice: an advisory same-day scan that produces a
//! readable error, and the `screenings_no_hall_overlap` exclusion constraint
//! that settles concurrent creates. A constraint violation is translated to
//! the same scheduling-conflict error the advisory scan raises.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateScreening, Screening, UpdateScreening};
use crate::utils::error::AppError;

/// Parses a `HH:mm:ss` running time. Exactly three unsigned integer
/// components; hours capped at 23, minutes and seconds at 59.
pub fn parse_duration(text: &str) -> Result<Duration, AppError> {
    let bad = || {
        AppError::ValidationError(format!(
            "Duration '{}' is not a valid HH:mm:ss value",
            text
        ))
    };

    let parts: Vec<&str> = text.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(bad());
    };

    let component = |s: &str, max: i64| -> Result<i64, AppError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let value = s.parse::<i64>().map_err(|_| bad())?;
        if value > max {
            return Err(bad());
        }
        Ok(value)
    };

    let total = component(hours, 23)? * 3600 + component(minutes, 59)? * 60 + component(seconds, 59)?;
    if total == 0 {
        return Err(AppError::ValidationError(
            "Duration must be longer than zero".to_string(),
        ));
    }

    Ok(Duration::seconds(total))
}

/// Strict half-open interval intersection.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Midnight-to-midnight window around a start instant. A coarse pre-filter
/// for candidate screenings, not the overlap test itself.
pub fn day_window(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = start.date_naive().and_time(NaiveTime::MIN).and_utc();
    (midnight, midnight + Duration::days(1))
}

fn is_exclusion_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23P01"))
}

fn hall_taken() -> AppError {
    AppError::ScheduleConflict("Another screening occupies this hall at that time".to_string())
}

#[derive(Clone)]
pub struct ScheduleService {
    pool: PgPool,
}

impl ScheduleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: CreateScreening) -> Result<Screening, AppError> {
        let movie_duration = sqlx::query_scalar::<_, String>(
            "SELECT duration FROM movies WHERE id = $1",
        )
        .bind(data.movie_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie '{}' was not found", data.movie_id)))?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM theaters WHERE id = $1")
            .bind(data.theater_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Theater '{}' was not found", data.theater_id))
            })?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM halls WHERE id = $1 AND theater_id = $2")
            .bind(data.hall_id)
            .bind(data.theater_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Hall '{}' was not found in theater '{}'",
                    data.hall_id, data.theater_id
                ))
            })?;

        let duration_text = data.duration.unwrap_or(movie_duration);
        let duration = parse_duration(&duration_text)?;
        let starts_at = data.starts_at;
        let ends_at = starts_at + duration;

        self.check_hall_is_free(data.hall_id, starts_at, ends_at, None)
            .await?;

        let screening = sqlx::query_as::<_, Screening>(
            "INSERT INTO screenings (movie_id, theater_id, hall_id, starts_at, ends_at, duration)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(data.movie_id)
        .bind(data.theater_id)
        .bind(data.hall_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(&duration_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Concurrent create slipped past the advisory scan; the exclusion
            // constraint is the arbiter.
            if is_exclusion_violation(&e) {
                hall_taken()
            } else {
                e.into()
            }
        })?;

        Ok(screening)
    }

    pub async fn update(&self, id: Uuid, patch: UpdateScreening) -> Result<Screening, AppError> {
        let existing = self.get(id).await?;

        if let Some(movie_id) = patch.movie_id {
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM movies WHERE id = $1")
                .bind(movie_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Movie '{}' was not found", movie_id)))?;
        }

        let movie_id = patch.movie_id.unwrap_or(existing.movie_id);
        let starts_at = patch.starts_at.unwrap_or(existing.starts_at);
        let duration_text = patch.duration.unwrap_or(existing.duration);
        let duration = parse_duration(&duration_text)?;
        let ends_at = starts_at + duration;

        // Any change to the occupied interval gets the full conflict check,
        // with the screening itself excluded from the candidate set.
        if starts_at != existing.starts_at || ends_at != existing.ends_at {
            self.check_hall_is_free(existing.hall_id, starts_at, ends_at, Some(id))
                .await?;
        }

        let screening = sqlx::query_as::<_, Screening>(
            "UPDATE screenings
             SET movie_id = $2, starts_at = $3, ends_at = $4, duration = $5, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(movie_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(&duration_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_exclusion_violation(&e) {
                hall_taken()
            } else {
                e.into()
            }
        })?;

        Ok(screening)
    }

    pub async fn get(&self, id: Uuid) -> Result<Screening, AppError> {
        sqlx::query_as::<_, Screening>("SELECT * FROM screenings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Screening '{}' was not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Screening>, AppError> {
        let screenings =
            sqlx::query_as::<_, Screening>("SELECT * FROM screenings ORDER BY starts_at")
                .fetch_all(&self.pool)
                .await?;

        Ok(screenings)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM screenings WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::ValidationError(
                    "Screening still has bookings and cannot be deleted".to_string(),
                )
            }
            _ => e.into(),
        })?;

        if deleted.is_none() {
            return Err(AppError::NotFound(format!(
                "Screening '{}' was not found",
                id
            )));
        }

        Ok(())
    }

    async fn check_hall_is_free(
        &self,
        hall_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<(), AppError> {
        let (day_start, day_end) = day_window(starts_at);

        let candidates = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id, starts_at, ends_at FROM screenings
             WHERE hall_id = $1 AND starts_at >= $2 AND starts_at < $3",
        )
        .bind(hall_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        for (id, other_start, other_end) in candidates {
            if exclude == Some(id) {
                continue;
            }
            if overlaps(starts_at, ends_at, other_start, other_end) {
                return Err(AppError::ScheduleConflict(format!(
                    "Hall is occupied between {} and {}",
                    other_start.format("%Y-%m-%d %H:%M"),
                    other_end.format("%H:%M"),
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn parses_well_formed_durations() {
        assert_eq!(parse_duration("02:30:00").unwrap(), Duration::minutes(150));
        assert_eq!(parse_duration("00:00:01").unwrap(), Duration::seconds(1));
        assert_eq!(parse_duration("23:59:59").unwrap(), Duration::seconds(86_399));
    }

    #[test]
    fn rejects_malformed_durations() {
        for bad in [
            "", "90", "1:30", "01:30", "1:2:3:4", "24:00:00", "01:60:00", "01:00:60", "-1:00:00",
            "01:0a:00", "one:two:three", "01::00",
        ] {
            assert!(parse_duration(bad).is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(parse_duration("00:00:00").is_err());
    }

    #[test]
    fn evening_shows_clash_when_intervals_cross() {
        // 18:00-20:30 vs 19:00-21:00
        assert!(overlaps(at(19, 0), at(21, 0), at(18, 0), at(20, 30)));
    }

    #[test]
    fn containment_and_identity_are_overlaps() {
        assert!(overlaps(at(18, 30), at(19, 0), at(18, 0), at(20, 0)));
        assert!(overlaps(at(18, 0), at(20, 0), at(18, 0), at(20, 0)));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        // Half-open: a show may start the instant the previous one ends.
        assert!(!overlaps(at(20, 30), at(22, 0), at(18, 0), at(20, 30)));
        assert!(!overlaps(at(16, 0), at(18, 0), at(18, 0), at(20, 30)));
    }

    #[test]
    fn day_window_spans_local_midnights() {
        let (start, end) = day_window(at(19, 45));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }
}
