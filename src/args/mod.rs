//! CLI argument types and parsing helpers.
mod body;
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use body::resolve_body;
pub use cli::BenchArgs;
pub use types::{HttpMethod, PositiveU64, PositiveUsize};

pub(crate) use defaults::{DEFAULT_CONFIG_FILES, DEFAULT_USER_AGENT};
pub(crate) use parsers::parse_header;
