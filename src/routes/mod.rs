use axum::routing::{get, post};
use axum::Router;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{bookings, catalog, health_check, me, screenings};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/me", get(me))
        .route(
            "/movies",
            get(catalog::list_movies).post(catalog::create_movie),
        )
        .route(
            "/movies/:id",
            get(catalog::get_movie)
                .put(catalog::update_movie)
                .delete(catalog::delete_movie),
        )
        .route(
            "/theaters",
            get(catalog::list_theaters).post(catalog::create_theater),
        )
        .route(
            "/theaters/:id",
            get(catalog::get_theater)
                .put(catalog::update_theater)
                .delete(catalog::delete_theater),
        )
        .route("/theaters/:id/halls", get(catalog::list_halls))
        .route("/halls", post(catalog::create_hall))
        .route(
            "/halls/:id",
            get(catalog::get_hall)
                .put(catalog::update_hall)
                .delete(catalog::delete_hall),
        )
        .route(
            "/screenings",
            get(screenings::list_screenings).post(screenings::create_screening),
        )
        .route(
            "/screenings/:id",
            get(screenings::get_screening)
                .put(screenings::update_screening)
                .delete(screenings::delete_screening),
        )
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/my/bookings", get(bookings::list_my_bookings))
        .route(
            "/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/bookings/:id/used", post(bookings::mark_booking_used))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
