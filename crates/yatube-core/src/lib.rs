//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! Entities, the rules that govern them, and the ports infrastructure must
//! implement. No database, cache or HTTP dependencies live here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use pagination::{Page, Paginator};
