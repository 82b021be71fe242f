//! # Yatube Shared
//!
//! Wire types shared between the web server and its clients: submitted form
//! payloads, query strings and JSON responses.

pub mod dto;
pub mod response;

pub use response::HealthResponse;
