use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::booking::Booking;
use crate::fleet::{Fleet, SeatNumber, VehicleId};

/// Occupancy of one vehicle at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleOccupancy {
    pub id: VehicleId,
    pub name: String,
    pub capacity: u8,
    pub booked_seats: Vec<SeatNumber>,
    pub booked_count: u32,
    pub available_count: u32,
    pub occupancy_rate: f64,
}

/// Whole-fleet view rebuilt from a single `list_bookings` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSnapshot {
    pub vehicles: Vec<VehicleOccupancy>,
    pub total_seats: u32,
    pub total_booked: u32,
    pub total_available: u32,
    pub occupancy_rate: f64,
}

impl FleetSnapshot {
    pub fn build(fleet: &Fleet, bookings: &[Booking]) -> Self {
        let mut by_vehicle: HashMap<VehicleId, BTreeSet<SeatNumber>> = HashMap::new();
        for booking in bookings {
            by_vehicle
                .entry(booking.vehicle_id)
                .or_default()
                .insert(booking.seat_number);
        }

        let vehicles: Vec<VehicleOccupancy> = fleet
            .vehicles()
            .iter()
            .map(|vehicle| {
                let booked: Vec<SeatNumber> = by_vehicle
                    .remove(&vehicle.id)
                    .map(|seats| seats.into_iter().collect())
                    .unwrap_or_default();
                let capacity = vehicle.capacity as u32;
                let booked_count = booked.len() as u32;
                VehicleOccupancy {
                    id: vehicle.id,
                    name: vehicle.name.clone(),
                    capacity: vehicle.capacity,
                    booked_seats: booked,
                    booked_count,
                    available_count: capacity.saturating_sub(booked_count),
                    occupancy_rate: rate(booked_count, capacity),
                }
            })
            .collect();

        let total_seats = fleet.total_seats();
        let total_booked: u32 = vehicles.iter().map(|v| v.booked_count).sum();

        Self {
            vehicles,
            total_seats,
            total_booked,
            total_available: total_seats.saturating_sub(total_booked),
            occupancy_rate: rate(total_booked, total_seats),
        }
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleOccupancy> {
        self.vehicles.iter().find(|v| v.id == id)
    }
}

fn rate(booked: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        0.0
    } else {
        booked as f64 / capacity as f64 * 100.0
    }
}
