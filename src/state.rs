use sqlx::PgPool;

use crate::auth::RoleStore;
use crate::services::{BookingService, CatalogService, ScheduleService};

/// Explicitly constructed service objects shared by the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub roles: RoleStore,
    pub catalog: CatalogService,
    pub scheduling: ScheduleService,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            roles: RoleStore::new(pool.clone()),
            catalog: CatalogService::new(pool.clone()),
            scheduling: ScheduleService::new(pool.clone()),
            bookings: BookingService::new(pool),
        }
    }
}
