mod runner;
pub(crate) mod summary;

pub(crate) use runner::{RunOutcome, run_load};
