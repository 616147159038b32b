pub mod booking;
pub mod hall;
pub mod movie;
pub mod screening;
pub mod theater;
pub mod user;

pub use booking::{Booking, BookingStatus, CreateBooking, SeatReservation, UpdateBooking};
pub use hall::{CreateHall, Hall, SeatGrid, UpdateHall};
pub use movie::{CreateMovie, Movie, UpdateMovie};
pub use screening::{CreateScreening, Screening, UpdateScreening};
pub use theater::{CreateTheater, Theater, UpdateTheater};
pub use user::User;
