//! OAuth for Connect platforms
//!
//! [`authorize_url`] builds the URL a platform sends its users to; it makes
//! no network call. [`token`] and [`deauthorize`] are ordinary operations of
//! the `oauth` resource, which lives on the connect host.

use super::client::ApiClient;
use super::encoding::encode_form;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::resource::{Call, Host, Params, RequestOptions};
use crate::types::{OAuthDeauthorization, OAuthToken};
use serde_json::Value;

const AUTHORIZE_PATH: &str = "oauth/authorize";
const EXPRESS_PREFIX: &str = "express/";

/// Modifiers for [`authorize_url`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizeOptions {
    /// Use the Express account onboarding flow
    pub express: bool,
}

impl AuthorizeOptions {
    pub fn express() -> Self {
        Self { express: true }
    }
}

/// A param counts as unset when it is absent, null, `false` or an empty string.
fn is_unset(params: &Params, key: &str) -> bool {
    match params.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(_) => false,
    }
}

/// Configured client id, ignoring an empty one
fn default_client_id(config: &ClientConfig) -> Option<&str> {
    config.client_id.as_deref().filter(|id| !id.is_empty())
}

/// Build an authorize URL.
///
/// Caller params keep their order; `response_type=code`, the configured
/// `client_id` and `scope=read_write` fill in unset values. A new key is
/// appended, an unset one is replaced in place.
pub fn authorize_url(config: &ClientConfig, params: Option<Params>, options: AuthorizeOptions) -> String {
    let mut params = params.unwrap_or_default();

    if is_unset(&params, "response_type") {
        params.insert("response_type".to_string(), Value::from("code"));
    }
    fill_client_id(config, &mut params);
    if is_unset(&params, "scope") {
        params.insert("scope".to_string(), Value::from("read_write"));
    }

    let prefix = if options.express { EXPRESS_PREFIX } else { "" };
    format!(
        "{}/{}{}?{}",
        config.base_url(Host::Connect),
        prefix,
        AUTHORIZE_PATH,
        encode_form(&params)
    )
}

fn fill_client_id(config: &ClientConfig, params: &mut Params) {
    if is_unset(params, "client_id") {
        if let Some(client_id) = default_client_id(config) {
            params.insert("client_id".to_string(), Value::from(client_id));
        }
    }
}

/// Exchange an authorization code (or refresh token) for an access token.
pub async fn token(client: &ApiClient, params: Params, options: RequestOptions) -> Result<OAuthToken> {
    client
        .method("oauth", "token")?
        .call_as(Call::new().payload(params).options(options))
        .await
}

/// Disconnect an account from the platform.
///
/// The configured `client_id` fills in an unset one; an empty configured
/// id is never sent.
pub async fn deauthorize(
    client: &ApiClient,
    mut params: Params,
    options: RequestOptions,
) -> Result<OAuthDeauthorization> {
    fill_client_id(client.config(), &mut params);

    client
        .method("oauth", "deauthorize")?
        .call_as(Call::new().payload(params).options(options))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Option<Params> {
        value.as_object().cloned()
    }

    fn config_with_default_client() -> ClientConfig {
        ClientConfig::default().with_client_id("default_client_id")
    }

    #[test]
    fn test_explicit_client_id_without_default() {
        let config = ClientConfig::default().with_client_id("");
        let url = authorize_url(&config, params(json!({"client_id": "123abc"})), AuthorizeOptions::default());
        assert_eq!(
            url,
            "https://connect.stripe.com/oauth/authorize?client_id=123abc&response_type=code&scope=read_write"
        );
    }

    #[test]
    fn test_defaults_only() {
        let url = authorize_url(&config_with_default_client(), None, AuthorizeOptions::default());
        assert_eq!(
            url,
            "https://connect.stripe.com/oauth/authorize?response_type=code&client_id=default_client_id&scope=read_write"
        );
    }

    #[test]
    fn test_state_comes_first() {
        let url = authorize_url(
            &config_with_default_client(),
            params(json!({"state": "some_state"})),
            AuthorizeOptions::default(),
        );
        assert_eq!(
            url,
            "https://connect.stripe.com/oauth/authorize?state=some_state&response_type=code&client_id=default_client_id&scope=read_write"
        );
    }

    #[test]
    fn test_all_params_given() {
        let url = authorize_url(
            &config_with_default_client(),
            params(json!({"response_type": "code", "client_id": "123abc", "scope": "read_write"})),
            AuthorizeOptions::default(),
        );
        assert_eq!(
            url,
            "https://connect.stripe.com/oauth/authorize?response_type=code&client_id=123abc&scope=read_write"
        );
    }

    #[test]
    fn test_express_prefix() {
        let url = authorize_url(
            &config_with_default_client(),
            params(json!({
                "response_type": "code",
                "client_id": "123abc",
                "scope": "read_write",
                "state": "some_state"
            })),
            AuthorizeOptions::express(),
        );
        assert_eq!(
            url,
            "https://connect.stripe.com/express/oauth/authorize?response_type=code&client_id=123abc&scope=read_write&state=some_state"
        );
    }

    #[test]
    fn test_empty_values_are_filled_in_place() {
        let url = authorize_url(
            &config_with_default_client(),
            params(json!({"scope": "", "state": "s1", "response_type": null})),
            AuthorizeOptions::default(),
        );
        assert_eq!(
            url,
            "https://connect.stripe.com/oauth/authorize?scope=read_write&state=s1&response_type=code&client_id=default_client_id"
        );
    }

    #[test]
    fn test_fill_client_id() {
        let mut with_empty = params(json!({"stripe_user_id": "acct_1", "client_id": ""})).unwrap();
        fill_client_id(&config_with_default_client(), &mut with_empty);
        assert_eq!(with_empty["client_id"], "default_client_id");

        let mut explicit = params(json!({"client_id": "ca_explicit"})).unwrap();
        fill_client_id(&config_with_default_client(), &mut explicit);
        assert_eq!(explicit["client_id"], "ca_explicit");

        let mut untouched = params(json!({"stripe_user_id": "acct_1"})).unwrap();
        fill_client_id(&ClientConfig::default().with_client_id(""), &mut untouched);
        assert!(!untouched.contains_key("client_id"));
    }

    #[test]
    fn test_nested_user_params() {
        let url = authorize_url(
            &config_with_default_client(),
            params(json!({"stripe_user": {"email": "jenny@example.com"}})),
            AuthorizeOptions::default(),
        );
        assert!(url.contains("stripe_user[email]=jenny%40example.com"));
    }
}
