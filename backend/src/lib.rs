pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod stats;
pub mod upload;
