//! HTTP front end for the adaptive strategy engine.

pub mod app;
pub mod config;
pub mod routes;

pub use app::{build_app, AppState, SharedCrawler};
pub use config::Config;
