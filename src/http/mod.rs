//! Transport construction, request execution, and the worker loop.
mod cancel;
mod client;
mod execution;
mod request;
mod tls;
mod worker;


pub use cancel::CancelFlag;
pub use client::build_client;
pub use execution::{Exchange, effective_size, execute};
pub use request::{RequestPlan, escape_query, header_block_size};
pub use worker::{WorkerContext, run_worker, spawn_worker};
