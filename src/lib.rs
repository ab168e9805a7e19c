//! Declarative resource method dispatch for the Stripe REST API.
//!
//! API resources are described as data: a base path plus named operations,
//! each with an HTTP method, a path template and the ordered url parameters
//! that fill it. [`ApiClient::method`] binds one operation; calling it
//! validates the arguments, builds a [`ResolvedRequest`] and sends it
//! through a [`Transport`].
//!
//! ```ignore
//! use stripe_methods::{ApiClient, Call, ClientConfig};
//! use stripe_methods::types::SubscriptionSchedule;
//!
//! # async fn run() -> stripe_methods::Result<()> {
//! let client = ApiClient::new(ClientConfig::new("sk_test_...").with_env_overrides())?;
//! let schedule: SubscriptionSchedule = client
//!     .method("subscription_schedules", "cancel")?
//!     .call_as(Call::new().id("sub_sched_123"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod resource;
pub mod types;

pub use api::auth::ApiKey;
pub use api::client::ApiClient;
pub use api::http::HttpTransport;
pub use api::transport::{CallSettings, Transport};
pub use config::ClientConfig;
pub use error::{Error, RemoteApiError, RemoteErrorKind, Result};
pub use resource::{
    Call, CallArg, Host, HttpMethod, Method, MethodType, Params, RequestOptions, ResolvedRequest,
};

/// Version injected at compile time via STRIPE_METHODS_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("STRIPE_METHODS_VERSION") {
    Some(v) => v,
    None => "dev",
};
