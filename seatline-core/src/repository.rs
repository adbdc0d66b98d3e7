use async_trait::async_trait;

use crate::booking::{Booking, StoreError};
use crate::fleet::{SeatNumber, VehicleId};

/// Source of truth for seat bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All current bookings, in no particular order.
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    /// Insert-if-absent for one seat.
    ///
    /// The absence check and the insert must be a single atomic step inside
    /// the store. A second writer for the same pair gets
    /// [`StoreError::Conflict`].
    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError>;

    /// Remove every booking in one atomic step, returning how many were removed.
    /// On error no booking is removed.
    async fn clear_all_bookings(&self) -> Result<u64, StoreError>;
}

/// Allow-list of administrator reset codes
#[async_trait]
pub trait AdminCodeStore: Send + Sync {
    /// Exact, case-sensitive membership test. Blank input is never valid.
    async fn is_valid_code(&self, submitted: &str) -> Result<bool, StoreError>;
}
