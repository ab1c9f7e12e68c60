//! Domain library for the Emergency Bag Tracker service.

pub mod config;
pub mod error;
pub mod kit;
pub mod telemetry;

pub use error::AppError;
