pub mod analyzers;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod parser;
pub mod stats;
