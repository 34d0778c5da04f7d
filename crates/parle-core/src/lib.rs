//! Parle core: configuration, domain model and the backend gateways.

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod google;
pub mod model;
pub mod validation;
