#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the console top-up SDK.
//!
//! Provides [`ConsoleClient`], a `reqwest`-backed implementation of
//! [`topup::api::ConsoleApi`] that speaks the console's uniform
//! `{success, message, data}` envelope protocol.
//!
//! # Modules
//!
//! - [`client`] — The reqwest console client
//! - [`constants`] — Endpoint paths
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod client;
pub mod constants;

pub use client::{ConsoleClient, ConsoleClientError};
