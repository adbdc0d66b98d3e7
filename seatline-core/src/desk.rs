use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::booking::{Booking, StoreError};
use crate::events::{ChangeEvent, ChangeNotifier, ChangeSubscription};
use crate::fleet::{Fleet, SeatNumber, VehicleId};
use crate::gateway::SeatGateway;
use crate::repository::{AdminCodeStore, BookingStore};
use crate::snapshot::FleetSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResetError {
    #[error("Invalid admin code")]
    InvalidCode,
    #[error("Failed to clear bookings: {0}")]
    ClearFailed(String),
}

/// Applies the booking and reset policy over the injected stores.
///
/// Every successful mutation is followed by a change event so subscribers
/// re-fetch. Seat exclusivity is left entirely to the booking store.
#[derive(Clone)]
pub struct ReservationDesk {
    fleet: Fleet,
    bookings: Arc<dyn BookingStore>,
    codes: Arc<dyn AdminCodeStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl ReservationDesk {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        codes: Arc<dyn AdminCodeStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            fleet: Fleet::standard(),
            bookings,
            codes,
            notifier,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.bookings.list_bookings().await.map_err(|e| {
            error!("Error loading bookings: {}", e);
            e
        })
    }

    pub async fn snapshot(&self) -> Result<FleetSnapshot, StoreError> {
        let bookings = self.list_bookings().await?;
        Ok(FleetSnapshot::build(&self.fleet, &bookings))
    }

    pub async fn book_seat(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError> {
        match self.bookings.create_booking(vehicle_id, seat_number).await {
            Ok(booking) => {
                info!("Seat {} booked on vehicle {} ({})", seat_number, vehicle_id, booking.id);
                self.notifier.publish(ChangeEvent::inserted()).await;
                Ok(booking)
            }
            Err(e @ StoreError::Conflict { .. }) => {
                warn!("Booking conflict: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("Error booking seat {} on vehicle {}: {}", seat_number, vehicle_id, e);
                Err(e)
            }
        }
    }

    pub async fn verify_code(&self, code: &str) -> Result<bool, StoreError> {
        self.codes.is_valid_code(code).await.map_err(|e| {
            error!("Error verifying admin code: {}", e);
            e
        })
    }

    /// Clear all bookings if `code` is on the allow-list.
    ///
    /// A failing code lookup counts as an invalid code. Bookings are left
    /// untouched whenever an error is returned.
    pub async fn reset_all(&self, code: &str) -> Result<u64, ResetError> {
        // 1. Authorize
        let valid = self.verify_code(code).await.unwrap_or(false);
        if !valid {
            warn!("Reset rejected: invalid admin code");
            return Err(ResetError::InvalidCode);
        }

        // 2. Clear atomically
        let cleared = self.bookings.clear_all_bookings().await.map_err(|e| {
            error!("Error resetting bookings: {}", e);
            ResetError::ClearFailed(e.to_string())
        })?;

        // 3. Notify
        info!("All bookings reset, {} removed", cleared);
        self.notifier.publish(ChangeEvent::cleared()).await;
        Ok(cleared)
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        self.notifier.subscribe()
    }
}

#[async_trait]
impl SeatGateway for ReservationDesk {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        ReservationDesk::list_bookings(self).await
    }

    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError> {
        self.book_seat(vehicle_id, seat_number).await
    }

    async fn reset_all(&self, code: &str) -> Result<u64, ResetError> {
        ReservationDesk::reset_all(self, code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BroadcastNotifier, ChangeKind};
    use crate::memory::{MemoryAdminCodes, MemoryBookingStore};

    struct BrokenClear {
        inner: MemoryBookingStore,
    }

    #[async_trait]
    impl BookingStore for BrokenClear {
        async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
            self.inner.list_bookings().await
        }

        async fn create_booking(
            &self,
            vehicle_id: VehicleId,
            seat_number: SeatNumber,
        ) -> Result<Booking, StoreError> {
            self.inner.create_booking(vehicle_id, seat_number).await
        }

        async fn clear_all_bookings(&self) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }
    }

    fn ids(vehicle: i64, seat: i64) -> (VehicleId, SeatNumber) {
        (VehicleId::new(vehicle).unwrap(), SeatNumber::new(seat).unwrap())
    }

    fn desk_with(store: Arc<dyn BookingStore>) -> (ReservationDesk, BroadcastNotifier) {
        let notifier = BroadcastNotifier::new(16);
        let desk = ReservationDesk::new(
            store,
            Arc::new(MemoryAdminCodes::new(["RESET2024"])),
            Arc::new(notifier.clone()),
        );
        (desk, notifier)
    }

    #[tokio::test]
    async fn test_booking_publishes_change() {
        let (desk, notifier) = desk_with(Arc::new(MemoryBookingStore::new()));
        let mut sub = notifier.subscribe();
        let (v, s) = ids(2, 10);

        desk.book_seat(v, s).await.unwrap();

        assert_eq!(sub.next().await.unwrap().kind, ChangeKind::Inserted);
    }

    #[tokio::test]
    async fn test_conflict_does_not_publish() {
        let (desk, notifier) = desk_with(Arc::new(MemoryBookingStore::new()));
        let (v, s) = ids(2, 10);
        desk.book_seat(v, s).await.unwrap();

        let mut sub = notifier.subscribe();
        let err = desk.book_seat(v, s).await.unwrap_err();
        assert!(err.is_conflict());

        notifier.publish(ChangeEvent::resync()).await;
        assert_eq!(sub.next().await.unwrap().kind, ChangeKind::Resync);
    }

    #[tokio::test]
    async fn test_reset_with_invalid_code_keeps_bookings() {
        let (desk, _notifier) = desk_with(Arc::new(MemoryBookingStore::new()));
        let (v, s) = ids(1, 1);
        desk.book_seat(v, s).await.unwrap();

        assert_eq!(desk.reset_all("WRONG").await, Err(ResetError::InvalidCode));
        assert_eq!(desk.reset_all("").await, Err(ResetError::InvalidCode));
        assert_eq!(desk.list_bookings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_with_valid_code_clears_and_publishes() {
        let (desk, notifier) = desk_with(Arc::new(MemoryBookingStore::new()));
        for seat in [2, 15] {
            let (v, s) = ids(3, seat);
            desk.book_seat(v, s).await.unwrap();
        }
        let mut sub = notifier.subscribe();

        assert_eq!(desk.reset_all("RESET2024").await, Ok(2));
        assert!(desk.list_bookings().await.unwrap().is_empty());
        assert_eq!(sub.next().await.unwrap().kind, ChangeKind::Cleared);
    }

    #[tokio::test]
    async fn test_reset_clear_failure_leaves_bookings() {
        let store = Arc::new(BrokenClear { inner: MemoryBookingStore::new() });
        let (desk, _notifier) = desk_with(store.clone());
        let (v, s) = ids(4, 4);
        desk.book_seat(v, s).await.unwrap();

        let err = desk.reset_all("RESET2024").await.unwrap_err();
        assert!(matches!(err, ResetError::ClearFailed(_)));
        assert_eq!(store.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_store() {
        let (desk, _notifier) = desk_with(Arc::new(MemoryBookingStore::new()));
        for seat in [2, 15] {
            let (v, s) = ids(3, seat);
            desk.book_seat(v, s).await.unwrap();
        }

        let snapshot = desk.snapshot().await.unwrap();
        let bus3 = snapshot.vehicle(VehicleId::new(3).unwrap()).unwrap();
        assert_eq!(bus3.booked_count, 2);
        assert_eq!(bus3.available_count, 28);
    }
}
