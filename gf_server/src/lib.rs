//! HTTP backend for the greenify daily impact tracker.
//!
//! The binary wires [`config::ServerConfig`] into the managers from the
//! `greenify` library and serves [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
