use async_trait::async_trait;

use crate::booking::{Booking, StoreError};
use crate::desk::ResetError;
use crate::fleet::{SeatNumber, VehicleId};

/// What a dashboard client needs from the backend.
///
/// Implemented in-process by [`crate::ReservationDesk`] and over HTTP by the
/// dashboard crate.
#[async_trait]
pub trait SeatGateway: Send + Sync {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError>;

    /// Verify `code` and clear every booking. Returns the number removed.
    async fn reset_all(&self, code: &str) -> Result<u64, ResetError>;
}
