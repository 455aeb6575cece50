//! Fuel station finder server.
//!
//! Polls a fuel-price feed and a directions API, selects and ranks nearby
//! stations around the user's position — optionally only those ahead along
//! the travel heading — and serves the ranked snapshot over a JSON API.

pub mod domain;
pub mod geo;
pub mod prices;
pub mod ranker;
pub mod routing;
pub mod session;
pub mod settings;
pub mod web;
