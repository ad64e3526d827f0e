use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::HotelSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub hotel_id: String,
    pub check_in: NaiveDateTime,
    pub check_out: NaiveDateTime,
    pub room_number: i64,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Monotonic: PENDING may become PAID, never the reverse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PAID" => PaymentStatus::Paid,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Booking joined with the hotel it reserves, for user-facing listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithHotel {
    #[serde(flatten)]
    pub booking: Booking,
    pub hotel: HotelSummary,
}
