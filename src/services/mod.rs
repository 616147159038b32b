pub mod bookings;
pub mod catalog;
pub mod scheduling;
pub mod seating;

pub use bookings::BookingService;
pub use catalog::CatalogService;
pub use scheduling::ScheduleService;
