//! Seams the host application implements: storage and the delegate crawler.

pub mod fetcher;
pub mod store;
