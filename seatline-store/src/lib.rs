pub mod app_config;
pub mod database;
pub mod booking_repo;
pub mod admin_repo;
pub mod redis_repo;
pub mod events;

pub use database::DbClient;
pub use booking_repo::PgBookingStore;
pub use admin_repo::PgAdminCodeStore;
pub use redis_repo::RedisClient;
pub use events::RedisChangeFeed;

use seatline_core::StoreError;

pub(crate) fn backend_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}
