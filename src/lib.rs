pub mod batch;
pub mod config;
pub mod export;
pub mod script_runner;

pub use batch::{run_batch, BatchOptions, BatchProgress, BatchSummary};
pub use export::Adapter;
