//! Configuration module for the names search service

mod service_config;

pub use service_config::*;
