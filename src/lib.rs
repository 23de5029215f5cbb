//! Overlay line charts of closing prices per symbol.
//!
//! A [`services::DataSource`] (CSV file or the candles HTTP API) yields a
//! [`models::Dataset`]; [`services::chart_service`] lays it out and renders
//! one line per symbol into a PNG.

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;
