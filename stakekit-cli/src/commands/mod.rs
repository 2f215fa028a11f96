//! CLI command implementations

pub mod backend;
pub mod config;
pub mod delegate;
pub mod normalize;
pub mod pool;
