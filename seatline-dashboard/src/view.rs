use serde::Serialize;
use std::collections::BTreeSet;

use seatline_core::{SeatNumber, Vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    Available,
    Booked,
}

/// Locally cached occupancy of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleView {
    pub vehicle: Vehicle,
    booked: BTreeSet<SeatNumber>,
}

impl VehicleView {
    pub fn new(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            booked: BTreeSet::new(),
        }
    }

    pub fn seat_state(&self, seat: SeatNumber) -> SeatState {
        if self.booked.contains(&seat) {
            SeatState::Booked
        } else {
            SeatState::Available
        }
    }

    pub fn booked_seats(&self) -> impl Iterator<Item = SeatNumber> + '_ {
        self.booked.iter().copied()
    }

    pub fn booked_count(&self) -> u32 {
        self.booked.len() as u32
    }

    pub fn available_count(&self) -> u32 {
        (self.vehicle.capacity as u32).saturating_sub(self.booked_count())
    }

    pub(crate) fn mark_booked(&mut self, seat: SeatNumber) {
        self.booked.insert(seat);
    }

    pub(crate) fn replace(&mut self, seats: BTreeSet<SeatNumber>) {
        self.booked = seats;
    }
}
