//! Client view-model for the seat board.
//!
//! A [`Dashboard`] caches which seats are booked, turns clicks into booking
//! requests and drives the administrator reset dialog. It talks to the
//! backend through any [`seatline_core::SeatGateway`]: in-process via
//! `ReservationDesk` or remotely via [`HttpGateway`] and [`SseChangeFeed`].

pub mod dashboard;
pub mod notice;
pub mod remote;
pub mod reset;
pub mod sse;
pub mod view;

pub use dashboard::{Dashboard, SeatClick};
pub use notice::{Notice, NoticeLevel};
pub use remote::HttpGateway;
pub use reset::{ResetFlow, ResetSubmit};
pub use sse::{SseChangeFeed, SseFrame, SseParser};
pub use view::{SeatState, VehicleView};
