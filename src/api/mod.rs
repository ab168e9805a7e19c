//! API interaction module
//!
//! Everything between a resolved request and the remote API: credentials,
//! the client, the transport seam and its HTTP implementation, plus the
//! OAuth helpers for Connect platforms.
//!
//! # Module Structure
//!
//! - [`auth`] - API key handling
//! - [`client`] - Main client for calling resource operations
//! - [`encoding`] - Form encoding of request data
//! - [`http`] - reqwest transport
//! - [`oauth`] - Authorize URLs, token exchange and deauthorization
//! - [`transport`] - The transport trait
//!
//! # Example
//!
//! ```ignore
//! use stripe_methods::{ApiClient, Call, ClientConfig};
//!
//! async fn example() -> stripe_methods::Result<()> {
//!     let client = ApiClient::new(ClientConfig::new("sk_test_..."))?;
//!     let customers = client.invoke("customers", "list", Call::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod encoding;
pub mod http;
pub mod oauth;
pub mod transport;
