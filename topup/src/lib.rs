#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types and flow logic for console account top-ups.
//!
//! This crate is the heart of a client SDK for the account console of a
//! hosted API platform: topping up an account balance through a payment
//! provider, reading the current quota, caching the account's first API key,
//! and sharing an invite link. It owns the flow state machines and the wire
//! types; actual HTTP transport lives in the companion `topup-http` crate,
//! which implements the [`api::ConsoleApi`] trait with `reqwest`.
//!
//! Everything the hosting page normally provides ambiently (navigation,
//! clipboard, persistent storage, toast notices) is modeled as an injected
//! capability trait, so the flows stay testable and host-agnostic.
//!
//! # Modules
//!
//! - [`amount`] - Clamped top-up amount parsing
//! - [`api`] - The console API client trait
//! - [`error`] - Flow error types
//! - [`flow`] - The top-up flow state machine
//! - [`invite`] - Session-cached invite link sharing
//! - [`notice`] - Transient user notices
//! - [`page`] - Hosting-page capability (navigation, clipboard, origin)
//! - [`payment`] - Payment link classification (redirect vs QR)
//! - [`proto`] - Wire format types for the console endpoints
//! - [`quota`] - Quota-to-currency rendering
//! - [`store`] - Key/value storage capability
//! - [`token`] - Fetch-once cache of the account's first API key
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod api;
pub mod error;
pub mod flow;
pub mod invite;
pub mod notice;
pub mod page;
pub mod payment;
pub mod proto;
pub mod quota;
pub mod store;
pub mod token;
