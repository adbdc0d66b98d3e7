use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::booking::{Booking, StoreError};
use crate::fleet::{SeatNumber, VehicleId};
use crate::repository::{AdminCodeStore, BookingStore};

/// In-memory booking store.
///
/// The existence check and the insert run under the same write guard, which
/// gives the same insert-if-absent guarantee as a unique index.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    bookings: RwLock<HashMap<(VehicleId, SeatNumber), Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.bookings.read().await.values().cloned().collect())
    }

    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError> {
        let mut bookings = self.bookings.write().await;
        let key = (vehicle_id, seat_number);
        if bookings.contains_key(&key) {
            return Err(StoreError::Conflict { vehicle_id, seat_number });
        }
        let booking = Booking::new(vehicle_id, seat_number);
        bookings.insert(key, booking.clone());
        Ok(booking)
    }

    async fn clear_all_bookings(&self) -> Result<u64, StoreError> {
        let mut bookings = self.bookings.write().await;
        let removed = bookings.len() as u64;
        bookings.clear();
        Ok(removed)
    }
}

/// In-memory admin code allow-list.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdminCodes {
    codes: HashSet<String>,
}

impl MemoryAdminCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(Into::into)
                .filter(|c: &String| !c.trim().is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl AdminCodeStore for MemoryAdminCodes {
    async fn is_valid_code(&self, submitted: &str) -> Result<bool, StoreError> {
        if submitted.trim().is_empty() {
            return Ok(false);
        }
        Ok(self.codes.contains(submitted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seat(vehicle: i64, seat: i64) -> (VehicleId, SeatNumber) {
        (VehicleId::new(vehicle).unwrap(), SeatNumber::new(seat).unwrap())
    }

    #[tokio::test]
    async fn test_second_create_for_same_seat_conflicts() {
        let store = MemoryBookingStore::new();
        let (v, s) = seat(3, 7);

        store.create_booking(v, s).await.unwrap();
        let err = store.create_booking(v, s).await.unwrap_err();

        assert_eq!(err, StoreError::Conflict { vehicle_id: v, seat_number: s });
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_exactly_one_wins() {
        let store = Arc::new(MemoryBookingStore::new());
        let (v, s) = seat(3, 7);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_booking(v, s).await })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) if e.is_conflict() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_then_list_is_empty() {
        let store = MemoryBookingStore::new();
        for n in 1..=5 {
            let (v, s) = seat(n, n);
            store.create_booking(v, s).await.unwrap();
        }

        assert_eq!(store.clear_all_bookings().await.unwrap(), 5);
        assert!(store.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_code_membership() {
        let codes = MemoryAdminCodes::new(["RESET2024"]);
        assert!(!codes.is_valid_code("").await.unwrap());
        assert!(!codes.is_valid_code("   ").await.unwrap());
        assert!(!codes.is_valid_code("NOPE").await.unwrap());
        assert!(!codes.is_valid_code("reset2024").await.unwrap());
        assert!(codes.is_valid_code("RESET2024").await.unwrap());
    }
}
