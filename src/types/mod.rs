//! Typed declarations for API objects and parameters
//!
//! These mirror the shapes the remote API documents. Every field the API may
//! omit is optional, so decoding an older or newer API version does not fail.
//! Use them with [`crate::resource::Method::call_as`] and
//! [`crate::resource::Call::params`].

mod billing;
mod issuing;
mod list;
mod oauth;
mod three_d_secure;

pub use billing::{Recipient, SubscriptionSchedule, SubscriptionScheduleStatus};
pub use issuing::{
    CardDetails, CardReplacementReason, CardStatus, CardType, IssuingCard,
    IssuingCardCreateParams, IssuingCardListParams, IssuingCardUpdateParams,
};
pub use list::{ApiList, DeletedObject, RangeQuery};
pub use oauth::{OAuthDeauthorization, OAuthToken};
pub use three_d_secure::{ThreeDSecure, ThreeDSecureCreateParams, ThreeDSecureRetrieveParams};

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Free-form key/value pairs attached to an object
pub type Metadata = HashMap<String, String>;

/// Convert a Unix timestamp in seconds
pub fn timestamp_to_datetime(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}
