//! Search backend access

pub mod client;

pub use client::{parse_count, CountResponse, SearchClient};
