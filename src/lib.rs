// Library target holds the scoring and progression core plus storage. The
// terminal front end in main.rs and the benchmarks both import from here.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod logging;
pub mod session;
pub mod store;
