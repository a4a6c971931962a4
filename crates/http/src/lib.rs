//! Assist HTTP client
//!
//! Typed access to the Assist backend (chat, receipts, admin back-office)
//! through a single client that attaches bearer credentials from an injected
//! session store and recovers once from an expired access token by refreshing
//! it and replaying the failed request.

pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::error::ClientError;
#[cfg(feature = "client")]
pub use client::{AssistClient, AssistClientBuilder};

/// Result type alias using ClientError
#[cfg(feature = "client")]
pub type Result<T> = std::result::Result<T, ClientError>;
