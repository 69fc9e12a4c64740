//! Ride pooling server.
//!
//! Groups point-to-point ride requests into shared rides under seat,
//! luggage and detour limits, and prices each ride per passenger.

pub mod domain;
pub mod matching;
pub mod pricing;
pub mod store;
pub mod web;
