use std::sync::Arc;

use seatline_core::{AdminCodeStore, BookingStore, SeatNumber, VehicleId};
use seatline_store::app_config::DatabaseConfig;
use seatline_store::{DbClient, PgAdminCodeStore, PgBookingStore};

async fn connect() -> DbClient {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        ..DatabaseConfig::default()
    };
    let db = DbClient::new(&config).await.expect("Failed to connect");
    db.migrate().await.expect("Failed to migrate");
    db
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn test_unique_constraint_rejects_concurrent_insert() {
    let db = connect().await;
    let store = Arc::new(PgBookingStore::new(db.pool.clone()));
    store.clear_all_bookings().await.unwrap();

    let v = VehicleId::new(3).unwrap();
    let s = SeatNumber::new(7).unwrap();
    let (a, b) = tokio::join!(store.create_booking(v, s), store.create_booking(v, s));

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(loser.is_conflict());
    assert_eq!(store.list_bookings().await.unwrap().len(), 1);

    assert_eq!(store.clear_all_bookings().await.unwrap(), 1);
    assert!(store.list_bookings().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
async fn test_admin_code_lookup() {
    let db = connect().await;
    let codes = PgAdminCodeStore::new(db.pool.clone());
    codes.seed_codes(&["PGRESET".to_string(), " ".to_string()]).await.unwrap();

    assert!(codes.is_valid_code("PGRESET").await.unwrap());
    assert!(!codes.is_valid_code("pgreset").await.unwrap());
    assert!(!codes.is_valid_code("").await.unwrap());
}
