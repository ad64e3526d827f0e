use chrono::NaiveDateTime;

use crate::db::queries;
use crate::models::PaymentStatus;
use crate::state::AppState;

const DAY_SECONDS: f64 = 86_400.0;

/// Nights billed for a stay: the day span rounded to the nearest whole day,
/// floored at one so a same-day booking still bills a night.
pub fn billed_nights(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
    let span = (check_out - check_in).num_seconds().abs() as f64;
    ((span / DAY_SECONDS).round() as i64).max(1)
}

/// Reconcile a checkout session into the booking it paid for.
///
/// Invoked from both the authenticated status poll and the unauthenticated
/// webhook, any number of times. A session without our metadata, or whose
/// booking is already PAID, is a silent no-op; the PENDING→PAID transition
/// itself is a conditional update, so concurrent invocations cannot apply it
/// twice.
pub async fn fulfill(state: &AppState, session_id: &str) -> anyhow::Result<()> {
    let session = state.payments.retrieve_session(session_id, true).await?;

    let Some(booking_id) = session.metadata.get("bookingId") else {
        // Not one of ours: shared provider accounts deliver foreign sessions.
        return Ok(());
    };

    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    };
    let Some(booking) = booking else {
        tracing::warn!(
            booking_id = %booking_id,
            session_id = %session_id,
            "no booking for checkout session metadata"
        );
        return Ok(());
    };

    if booking.payment_status == PaymentStatus::Paid {
        return Ok(());
    }

    if session.payment_status == "paid" {
        let transitioned = {
            let db = state.db.lock().unwrap();
            queries::mark_booking_paid(&db, &booking.id)?
        };
        if transitioned {
            tracing::info!(booking_id = %booking.id, session_id = %session_id, "booking marked paid");
        }
    }

    Ok(())
}
