//! Core domain layer for the ReLive client.
//!
//! Holds the domain model (sessions, media assets, draft memories, upload reports),
//! the ports that infrastructure and interaction crates implement, and the shared
//! error type.

pub mod capture;
pub mod config;
pub mod error;
pub mod family;
pub mod http;
pub mod media;
pub mod memory;
pub mod session;
pub mod user;

pub use error::{ReliveError, Result};
