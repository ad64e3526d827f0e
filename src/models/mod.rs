pub mod booking;
pub mod hotel;

pub use booking::{Booking, BookingWithHotel, PaymentStatus};
pub use hotel::{Hotel, HotelSummary, RankedHotel};
