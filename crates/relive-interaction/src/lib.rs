//! Network layer of the ReLive client.
//!
//! [`ReqwestTransport`] performs raw HTTP exchanges, [`TokenLifecycleManager`]
//! keeps the session usable, [`AuthenticatedRequestClient`] attaches
//! credentials and recovers from a rejected token once, and [`ReliveApi`]
//! exposes the backend endpoints with typed results.

pub mod api;
pub mod authenticated_client;
pub mod dto;
pub mod reqwest_transport;
pub mod routes;
pub mod token_lifecycle;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::ReliveApi;
pub use authenticated_client::AuthenticatedRequestClient;
pub use reqwest_transport::ReqwestTransport;
pub use token_lifecycle::TokenLifecycleManager;
