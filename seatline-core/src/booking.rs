use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fleet::{SeatNumber, VehicleId};

/// A persisted claim on one seat of one vehicle.
///
/// At most one booking exists per `(vehicle_id, seat_number)`. Bookings are
/// never updated and only disappear through a full reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    pub seat_number: SeatNumber,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(vehicle_id: VehicleId, seat_number: SeatNumber) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            seat_number,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> (VehicleId, SeatNumber) {
        (self.vehicle_id, self.seat_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Seat {seat_number} on vehicle {vehicle_id} is already booked")]
    Conflict {
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    },
    #[error("Store unavailable: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
