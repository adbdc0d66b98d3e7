use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use seatline_core::{Booking, BookingStore, SeatNumber, StoreError, VehicleId};

use crate::backend_error;

/// Postgres booking store.
///
/// Seat exclusivity comes from the `bookings_vehicle_seat_key` unique
/// constraint; a losing concurrent insert surfaces as a unique violation.
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    vehicle_id: i16,
    seat_number: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            vehicle_id: VehicleId::new(row.vehicle_id.into()).map_err(backend_error)?,
            seat_number: SeatNumber::new(row.seat_number.into()).map_err(backend_error)?,
            created_at: row.created_at,
        })
    }
}

fn insert_error(e: sqlx::Error, vehicle_id: VehicleId, seat_number: SeatNumber) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict { vehicle_id, seat_number };
        }
    }
    backend_error(e)
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, vehicle_id, seat_number, created_at FROM bookings",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (vehicle_id, seat_number)
            VALUES ($1, $2)
            RETURNING id, vehicle_id, seat_number, created_at
            "#,
        )
        .bind(vehicle_id.get() as i16)
        .bind(seat_number.get() as i16)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, vehicle_id, seat_number))?;

        Booking::try_from(row)
    }

    async fn clear_all_bookings(&self) -> Result<u64, StoreError> {
        // Dropping the transaction on error rolls it back
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        let result = sqlx::query("DELETE FROM bookings")
            .execute(&mut *tx)
            .await
            .map_err(backend_error)?;

        tx.commit().await.map_err(backend_error)?;

        debug!("Deleted {} booking rows", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = BookingRow {
            id: Uuid::new_v4(),
            vehicle_id: 3,
            seat_number: 7,
            created_at: Utc::now(),
        };
        let booking = Booking::try_from(row).unwrap();
        assert_eq!(booking.vehicle_id.get(), 3);
        assert_eq!(booking.seat_number.get(), 7);
    }

    #[test]
    fn test_out_of_range_row_is_backend_error() {
        let row = BookingRow {
            id: Uuid::new_v4(),
            vehicle_id: 12,
            seat_number: 7,
            created_at: Utc::now(),
        };
        assert!(matches!(Booking::try_from(row), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_non_database_error_is_not_conflict() {
        let err = insert_error(
            sqlx::Error::RowNotFound,
            VehicleId::new(1).unwrap(),
            SeatNumber::new(1).unwrap(),
        );
        assert!(!err.is_conflict());
    }
}
