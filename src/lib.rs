//! Core library for the `volley` CLI.
//!
//! `volley` keeps a fixed number of workers each issuing one HTTP request at a
//! time against a single target for a wall-clock duration, then reports
//! throughput, latency percentiles and a tally of failure root causes. The
//! binary is a thin wrapper around [`entry::run`].
mod adapters;
mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
mod logger;
pub mod metrics;
mod shutdown;
mod shutdown_handlers;

#[cfg(test)]
mod test_support;
