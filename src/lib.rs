//! ZigBee channel bridge library.
//!
//! Converts between ZigBee cluster traffic on a device endpoint and the
//! typed channels of a home-automation host.

pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod handler;
pub mod simulation;
pub mod thing;
pub mod zcl;
