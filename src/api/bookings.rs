use tracing::{debug, instrument};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::Booking;

#[instrument(skip(gateway))]
pub(crate) async fn get_bookings(gateway: &Gateway) -> Result<Vec<Booking>> {
    let bookings: Vec<Booking> = gateway.get("/api/bookings").await?;
    debug!(count = bookings.len(), "fetched bookings");
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::BookingStatus;
    use crate::test_support::MockBackend;

    #[tokio::test]
    async fn test_bookings_live_under_api_prefix() {
        let mock = MockBackend::start().await;
        mock.ok(
            "GET",
            "/api/bookings",
            json!([{
                "_id": "b1",
                "customerEmail": "guest@x.com",
                "startTime": "2026-10-20T17:00:00Z",
                "durationMinutes": 90,
                "status": "confirmed"
            }]),
        );
        let client = mock.client();

        let bookings = get_bookings(client.gateway()).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);
        assert_eq!(bookings[0].duration_minutes, 90);
        assert_eq!(mock.requests()[0].path, "/api/bookings");
    }
}
