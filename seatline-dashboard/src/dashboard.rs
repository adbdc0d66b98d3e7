use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use seatline_core::{
    Booking, ChangeNotifier, ChangeSubscription, Fleet, ResetError, SeatGateway, SeatNumber,
    StoreError, VehicleId,
};

use crate::notice::{self, Notice};
use crate::reset::{ResetFlow, ResetSubmit, VerifyingGuard};
use crate::view::{SeatState, VehicleView};

/// Outcome of clicking a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatClick {
    /// Seat already booked (or unknown vehicle); nothing was sent.
    Ignored,
    Booked(Booking),
    /// Someone else got there first; the cache was re-fetched.
    Conflict,
    Failed,
}

/// Client-side view-model for one viewer.
///
/// Holds a cache of booked seats per vehicle, re-synchronized from the
/// gateway on every change event. All failures end up as [`Notice`]s.
pub struct Dashboard {
    gateway: Arc<dyn SeatGateway>,
    changes: ChangeSubscription,
    fleet: Fleet,
    vehicles: Vec<VehicleView>,
    reset: ResetFlow,
    notices: Vec<Notice>,
}

impl Dashboard {
    /// Subscribes to `notifier` immediately. The cache starts empty; call
    /// [`Dashboard::refresh`] or use [`Dashboard::connect`].
    pub fn new(gateway: Arc<dyn SeatGateway>, notifier: &dyn ChangeNotifier) -> Self {
        let fleet = Fleet::standard();
        let vehicles = fleet.vehicles().iter().cloned().map(VehicleView::new).collect();
        Self {
            gateway,
            changes: notifier.subscribe(),
            fleet,
            vehicles,
            reset: ResetFlow::Closed,
            notices: Vec::new(),
        }
    }

    pub async fn connect(gateway: Arc<dyn SeatGateway>, notifier: &dyn ChangeNotifier) -> Self {
        let mut dashboard = Self::new(gateway, notifier);
        dashboard.refresh().await;
        dashboard
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn vehicles(&self) -> &[VehicleView] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleView> {
        self.vehicles.iter().find(|v| v.vehicle.id == id)
    }

    pub fn seat_state(&self, vehicle_id: VehicleId, seat: SeatNumber) -> SeatState {
        self.vehicle(vehicle_id)
            .map(|v| v.seat_state(seat))
            .unwrap_or(SeatState::Available)
    }

    pub fn total_booked(&self) -> u32 {
        self.vehicles.iter().map(VehicleView::booked_count).sum()
    }

    pub fn total_available(&self) -> u32 {
        self.fleet.total_seats().saturating_sub(self.total_booked())
    }

    pub fn reset_flow(&self) -> &ResetFlow {
        &self.reset
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Re-fetch every booking and rebuild the cache.
    ///
    /// On failure the previous cache is kept and an error notice is queued.
    pub async fn refresh(&mut self) -> bool {
        match self.gateway.list_bookings().await {
            Ok(bookings) => {
                self.apply(&bookings);
                true
            }
            Err(e) => {
                error!("Error loading bookings: {}", e);
                self.notices.push(Notice::error("Error", notice::LOAD_FAILED));
                false
            }
        }
    }

    fn apply(&mut self, bookings: &[Booking]) {
        let mut by_vehicle: HashMap<VehicleId, BTreeSet<SeatNumber>> = HashMap::new();
        for booking in bookings {
            by_vehicle
                .entry(booking.vehicle_id)
                .or_default()
                .insert(booking.seat_number);
        }
        for view in &mut self.vehicles {
            view.replace(by_vehicle.remove(&view.vehicle.id).unwrap_or_default());
        }
        debug!("Dashboard synced, {} seats booked", self.total_booked());
    }

    /// Wait for the next change event and re-fetch.
    ///
    /// Returns `false` once the change feed has closed.
    pub async fn sync_next_change(&mut self) -> bool {
        match self.changes.next().await {
            Some(event) => {
                debug!("Change event {:?}, re-fetching", event.kind);
                self.refresh().await;
                true
            }
            None => false,
        }
    }

    pub async fn run_until_closed(&mut self) {
        while self.sync_next_change().await {}
        info!("Change feed closed, dashboard sync stopped");
    }

    // ========================================================================
    // Booking
    // ========================================================================

    pub async fn click_seat(&mut self, vehicle_id: VehicleId, seat: SeatNumber) -> SeatClick {
        let name = match self.vehicle(vehicle_id) {
            Some(view) if view.seat_state(seat) == SeatState::Available => view.vehicle.name.clone(),
            _ => return SeatClick::Ignored,
        };

        match self.gateway.create_booking(vehicle_id, seat).await {
            Ok(booking) => {
                if let Some(view) = self.vehicles.iter_mut().find(|v| v.vehicle.id == vehicle_id) {
                    view.mark_booked(seat);
                }
                self.notices.push(Notice::success(
                    "Seat Booked!",
                    format!("Seat {} in {} has been booked successfully.", seat, name),
                ));
                SeatClick::Booked(booking)
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("Seat {} in {} was already taken", seat, name);
                // Cache was stale
                self.refresh().await;
                self.notices.push(Notice::error("Booking Failed", notice::SEAT_TAKEN));
                SeatClick::Conflict
            }
            Err(e) => {
                error!("Error booking seat: {}", e);
                self.notices.push(Notice::error("Error", notice::BOOKING_FAILED));
                SeatClick::Failed
            }
        }
    }

    // ========================================================================
    // Reset
    // ========================================================================

    pub fn open_reset(&mut self) {
        if !self.reset.is_open() {
            self.reset = ResetFlow::AwaitingCode {
                input: String::new(),
                error: None,
            };
        }
    }

    /// Replace the typed code. Input is upper-cased as it is entered.
    pub fn enter_code(&mut self, text: &str) {
        if let ResetFlow::AwaitingCode { input, .. } = &mut self.reset {
            *input = text.to_uppercase();
        }
    }

    pub fn cancel_reset(&mut self) {
        if matches!(self.reset, ResetFlow::AwaitingCode { .. }) {
            self.reset = ResetFlow::Closed;
        }
    }

    /// Verify the typed code and clear every booking.
    ///
    /// Dropping the returned future mid-request puts the dialog back in
    /// `AwaitingCode` with the code still filled in.
    pub async fn submit_reset(&mut self) -> ResetSubmit {
        if !self.reset.can_submit() {
            return ResetSubmit::Ignored;
        }
        let code = match std::mem::take(&mut self.reset) {
            ResetFlow::AwaitingCode { input, .. } => input,
            other => {
                self.reset = other;
                return ResetSubmit::Ignored;
            }
        };

        let gateway = Arc::clone(&self.gateway);
        let result = {
            let guard = VerifyingGuard::enter(&mut self.reset, code);
            let result = gateway.reset_all(guard.code()).await;
            guard.finish();
            result
        };

        match result {
            Ok(cleared) => {
                self.reset = ResetFlow::Closed;
                self.notices.push(Notice::success("All Buses Reset", notice::RESET_DONE));
                self.refresh().await;
                ResetSubmit::Completed { cleared }
            }
            Err(e) => {
                match &e {
                    ResetError::InvalidCode => warn!("Reset rejected: {}", e),
                    ResetError::ClearFailed(_) => {
                        error!("Error resetting bookings: {}", e);
                        self.notices.push(Notice::error("Reset Failed", notice::RESET_FAILED));
                    }
                }
                self.reset = ResetFlow::AwaitingCode {
                    input: String::new(),
                    error: Some(notice::INVALID_CODE.to_string()),
                };
                ResetSubmit::Rejected
            }
        }
    }
}
