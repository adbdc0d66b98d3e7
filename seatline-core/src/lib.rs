pub mod fleet;
pub mod booking;
pub mod events;
pub mod repository;
pub mod memory;
pub mod snapshot;
pub mod desk;
pub mod gateway;

pub use fleet::{Fleet, SeatNumber, Vehicle, VehicleId, FLEET_SIZE, SEATS_PER_VEHICLE};
pub use booking::{Booking, StoreError};
pub use events::{
    BroadcastNotifier, ChangeEvent, ChangeKind, ChangeNotifier, ChangeSubscription, CHANGE_EVENT_NAME,
};
pub use repository::{AdminCodeStore, BookingStore};
pub use memory::{MemoryAdminCodes, MemoryBookingStore};
pub use snapshot::{FleetSnapshot, VehicleOccupancy};
pub use desk::{ReservationDesk, ResetError};
pub use gateway::SeatGateway;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid vehicle id {0}: expected 1..={max}", max = FLEET_SIZE)]
    InvalidVehicle(i64),
    #[error("Invalid seat number {0}: expected 1..={max}", max = SEATS_PER_VEHICLE)]
    InvalidSeat(i64),
}

pub type CoreResult<T> = Result<T, CoreError>;
