use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use seatline_core::{
    AdminCodeStore, BookingStore, BroadcastNotifier, ChangeNotifier, MemoryAdminCodes,
    MemoryBookingStore, ReservationDesk,
};
use seatline_store::app_config::{Config, NotifierBackend, StoreBackend};
use seatline_store::{DbClient, PgAdminCodeStore, PgBookingStore, RedisChangeFeed, RedisClient};

#[derive(Clone)]
pub struct AppState {
    pub desk: ReservationDesk,
}

impl AppState {
    pub fn new(desk: ReservationDesk) -> Self {
        Self { desk }
    }

    /// Wire stores and notifier according to configuration.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (bookings, codes): (Arc<dyn BookingStore>, Arc<dyn AdminCodeStore>) =
            match config.store.backend {
                StoreBackend::Memory => {
                    info!("Using in-memory booking store");
                    let bookings: Arc<dyn BookingStore> = Arc::new(MemoryBookingStore::new());
                    let codes: Arc<dyn AdminCodeStore> =
                        Arc::new(MemoryAdminCodes::new(config.admin.codes.clone()));
                    (bookings, codes)
                }
                StoreBackend::Postgres => {
                    let db = DbClient::new(&config.database)
                        .await
                        .context("Failed to connect to Postgres")?;
                    db.migrate().await.context("Failed to run migrations")?;

                    let codes = PgAdminCodeStore::new(db.pool.clone());
                    codes
                        .seed_codes(&config.admin.codes)
                        .await
                        .context("Failed to seed admin codes")?;

                    info!("Using Postgres booking store");
                    let bookings: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(db.pool.clone()));
                    let codes: Arc<dyn AdminCodeStore> = Arc::new(codes);
                    (bookings, codes)
                }
            };

        let notifier: Arc<dyn ChangeNotifier> = match config.notifier.backend {
            NotifierBackend::Memory => Arc::new(BroadcastNotifier::new(config.notifier.capacity)),
            NotifierBackend::Redis => {
                let redis = RedisClient::new(&config.redis.url)
                    .await
                    .context("Invalid Redis URL")?;
                redis.ping().await.context("Failed to connect to Redis")?;
                let feed = RedisChangeFeed::start(
                    redis,
                    config.redis.channel.clone(),
                    config.notifier.capacity,
                )
                .await
                .context("Failed to subscribe to Redis change channel")?;
                info!("Change events fan out through Redis channel {}", config.redis.channel);
                Arc::new(feed)
            }
        };

        Ok(Self::new(ReservationDesk::new(bookings, codes, notifier)))
    }
}
