use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::Stream;
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use tracing::debug;

use seatline_core::{Booking, ChangeEvent, FleetSnapshot, SeatNumber, VehicleId, CHANGE_EVENT_NAME};

use crate::error::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookSeatRequest {
    pub vehicle_id: i64,
    pub seat_number: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/fleet", get(fleet_snapshot))
        .route("/v1/bookings", get(list_bookings).post(book_seat))
        .route("/v1/bookings/stream", get(stream_changes))
}

async fn fleet_snapshot(State(state): State<AppState>) -> Result<Json<FleetSnapshot>, AppError> {
    Ok(Json(state.desk.snapshot().await?))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.desk.list_bookings().await?))
}

async fn book_seat(
    State(state): State<AppState>,
    AppJson(req): AppJson<BookSeatRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let vehicle_id = VehicleId::new(req.vehicle_id)?;
    let seat_number = SeatNumber::new(req.seat_number)?;

    let booking = state.desk.book_seat(vehicle_id, seat_number).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Server-Sent Events feed of payload-free change notifications.
async fn stream_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.desk.subscribe().into_receiver();
    debug!("Change stream subscriber connected");

    let stream = BroadcastStream::new(rx).map(|result| {
        let change = match result {
            Ok(change) => change,
            Err(BroadcastStreamRecvError::Lagged(_)) => ChangeEvent::resync(),
        };
        Event::default().event(CHANGE_EVENT_NAME).json_data(change)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
