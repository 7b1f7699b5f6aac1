//! Session domain: credentials, expiry decoding, the store port, and lifecycle events.

mod event;
mod model;
mod store;
pub mod token;

pub use event::SessionEvent;
pub use model::{AuthTokens, Session};
pub use store::{InMemorySessionStore, SessionStore};
