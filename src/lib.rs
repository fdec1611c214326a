//! bandboard: dashboard backend for a futures-trading workflow.
//!
//! A REST + WebSocket façade over an in-memory store: account management,
//! order entry, position/P&L display, and a premium-versus-bands series.
//! The WebSocket layer keeps every connected viewer's local mirrors in
//! sync via typed change events.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;
