//! Incident desk: incident and comment records served through a
//! read-through cache that stays coherent with every mutation.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod query;
pub mod service;
pub mod state;

pub use error::{AppError, Result};
