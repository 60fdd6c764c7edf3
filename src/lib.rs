pub mod analyzers;
pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod store;
pub mod tables;
