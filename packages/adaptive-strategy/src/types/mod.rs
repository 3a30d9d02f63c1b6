//! Domain types for the adaptive strategy engine.

pub mod metrics;
pub mod outcome;
pub mod pattern;
pub mod request;
pub mod strategy;
