//! Resource method dispatch
//!
//! Resource descriptors are loaded from JSON files at compile time. Each
//! descriptor names a base path and a set of operations; the method factory
//! turns an operation plus call arguments into a request for the transport.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and validates resource descriptors from embedded JSON
//! - [`template`] - Substitutes url parameters into path templates
//! - [`args`] - Sorts call arguments into url parameters, payload and options
//! - [`method`] - Applies method type defaults and builds resolved requests
//!
//! # Resource Definitions
//!
//! Descriptors live in JSON files under `src/resources/`:
//! - `core.json` - customers, charges, refunds, payment intents, 3-D Secure, recipients
//! - `billing.json` - subscriptions, subscription schedules, invoices
//! - `connect.json` - OAuth and connected accounts
//! - `issuing.json` - Issuing cards, cardholders and authorizations
//!
//! # Example
//!
//! ```ignore
//! use stripe_methods::{ApiClient, Call, ClientConfig};
//!
//! async fn cancel(client: &ApiClient) -> stripe_methods::Result<serde_json::Value> {
//!     client
//!         .method("subscription_schedules", "cancel")?
//!         .call(Call::new().id("sub_sched_123"))
//!         .await
//! }
//! ```

pub mod args;
pub mod method;
pub mod registry;
pub mod template;

pub use args::{classify, Call, CallArg, Completion, Params, RequestOptions, OPTION_KEYS};
pub use method::{
    build_request, Method, ResolvedRequest, API_VERSION_HEADER, IDEMPOTENCY_KEY_HEADER,
};
pub use registry::{
    get_all_resource_keys, get_registry, get_resource, Host, HttpMethod, MethodType,
    OperationDef, Registry, ResourceDef, ResponseShape,
};
pub use template::PathPart;
