use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// Number of vehicles in the fleet.
pub const FLEET_SIZE: u8 = 8;

/// Fixed seat capacity of every vehicle.
pub const SEATS_PER_VEHICLE: u8 = 30;

/// Identifier of one vehicle, always within `1..=FLEET_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct VehicleId(u8);

impl VehicleId {
    pub fn new(raw: i64) -> CoreResult<Self> {
        if (1..=FLEET_SIZE as i64).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(CoreError::InvalidVehicle(raw))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every vehicle id in ascending order.
    pub fn all() -> impl Iterator<Item = VehicleId> {
        (1..=FLEET_SIZE).map(VehicleId)
    }
}

impl TryFrom<i64> for VehicleId {
    type Error = CoreError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<VehicleId> for u8 {
    fn from(id: VehicleId) -> u8 {
        id.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat position inside a vehicle, always within `1..=SEATS_PER_VEHICLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct SeatNumber(u8);

impl SeatNumber {
    pub fn new(raw: i64) -> CoreResult<Self> {
        if (1..=SEATS_PER_VEHICLE as i64).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(CoreError::InvalidSeat(raw))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = SeatNumber> {
        (1..=SEATS_PER_VEHICLE).map(SeatNumber)
    }
}

impl TryFrom<i64> for SeatNumber {
    type Error = CoreError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SeatNumber> for u8 {
    fn from(seat: SeatNumber) -> u8 {
        seat.0
    }
}

// Two-digit form, e.g. "07"
impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub capacity: u8,
}

impl Vehicle {
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            name: format!("Bus {}", id),
            capacity: SEATS_PER_VEHICLE,
        }
    }
}

/// The static fleet. Vehicles are not persisted; only bookings are.
#[derive(Debug, Clone)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn standard() -> Self {
        Self {
            vehicles: VehicleId::all().map(Vehicle::new).collect(),
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn total_seats(&self) -> u32 {
        self.vehicles.iter().map(|v| v.capacity as u32).sum()
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::standard()
    }
}
