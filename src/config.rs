//! Startup configuration: upstream base URL, outbound timeout, and operator credential
//! defaults.
//!
//! Every value can be supplied through the environment:
//!
//! | Variable                        | Field                          |
//! |---------------------------------|--------------------------------|
//! | `ACCESSKEY_PROXY_SECRET_KEY`    | `defaults.secret_key`          |
//! | `ACCESSKEY_PROXY_SHARED_KEY`    | `defaults.shared_key`          |
//! | `ACCESSKEY_PROXY_ORGANIZATION`  | `defaults.organization`        |
//! | `ACCESSKEY_PROXY_BASE_URL`      | `base_url`                     |
//! | `ACCESSKEY_PROXY_TIMEOUT_SECS`  | `request_timeout`              |
//!
//! Defaults are only ever what the operator configured; nothing falls back to a built-in
//! credential.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Upstream host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.ncr.com";

const ENV_SECRET_KEY: &str = "ACCESSKEY_PROXY_SECRET_KEY";
const ENV_SHARED_KEY: &str = "ACCESSKEY_PROXY_SHARED_KEY";
const ENV_ORGANIZATION: &str = "ACCESSKEY_PROXY_ORGANIZATION";
const ENV_BASE_URL: &str = "ACCESSKEY_PROXY_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "ACCESSKEY_PROXY_TIMEOUT_SECS";

/// Credential values used when a POST body omits a field.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperatorDefaults {
	/// Fallback secret key.
	pub secret_key: Option<Secret>,
	/// Fallback shared key.
	pub shared_key: Option<String>,
	/// Fallback organization.
	pub organization: Option<String>,
}
impl OperatorDefaults {
	/// Sets the fallback secret key.
	pub fn with_secret_key(mut self, value: impl Into<String>) -> Self {
		self.secret_key = Some(Secret::new(value));

		self
	}

	/// Sets the fallback shared key.
	pub fn with_shared_key(mut self, value: impl Into<String>) -> Self {
		self.shared_key = Some(value.into());

		self
	}

	/// Sets the fallback organization.
	pub fn with_organization(mut self, value: impl Into<String>) -> Self {
		self.organization = Some(value.into());

		self
	}
}
impl Debug for OperatorDefaults {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OperatorDefaults")
			.field("secret_key_set", &self.secret_key.is_some())
			.field("shared_key_set", &self.shared_key.is_some())
			.field("organization", &self.organization)
			.finish()
	}
}

/// Proxy configuration resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
	/// Operator-provided credential fallbacks.
	#[serde(default)]
	pub defaults: OperatorDefaults,
	/// Scheme and host of the upstream service.
	#[serde(default = "default_base_url")]
	pub base_url: Url,
	/// Outbound request timeout; `None` leaves the transport default.
	#[serde(default)]
	pub request_timeout: Option<Duration>,
}
impl ProxyConfig {
	/// Loads configuration from environment variables.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads configuration from an arbitrary key lookup; blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let mut config = Self::default();

		if let Some(v) = read(ENV_SECRET_KEY) {
			config.defaults.secret_key = Some(Secret::new(v));
		}
		if let Some(v) = read(ENV_SHARED_KEY) {
			config.defaults.shared_key = Some(v);
		}
		if let Some(v) = read(ENV_ORGANIZATION) {
			config.defaults.organization = Some(v);
		}
		if let Some(v) = read(ENV_BASE_URL) {
			config.base_url = Url::parse(v.trim())
				.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		}
		if let Some(v) = read(ENV_TIMEOUT_SECS) {
			let secs = v
				.trim()
				.parse::<i64>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(ConfigError::InvalidTimeout { value: v.clone() })?;

			config.request_timeout = Some(Duration::seconds(secs));
		}

		Ok(config)
	}

	/// Replaces the operator defaults.
	pub fn with_defaults(mut self, defaults: OperatorDefaults) -> Self {
		self.defaults = defaults;

		self
	}

	/// Points the proxy at a different upstream host.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = base_url;

		self
	}

	/// Sets the outbound request timeout.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}
}
impl Default for ProxyConfig {
	fn default() -> Self {
		Self {
			defaults: OperatorDefaults::default(),
			base_url: default_base_url(),
			request_timeout: None,
		}
	}
}

fn default_base_url() -> Url {
	Url::parse(DEFAULT_BASE_URL).expect("Default base URL is a valid absolute URL.")
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeMap;
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map = pairs
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect::<BTreeMap<_, _>>();

		move |key: &str| map.get(key).cloned()
	}

	#[test]
	fn empty_environment_configures_no_credentials() {
		let config = ProxyConfig::from_lookup(lookup(&[])).expect("Empty lookup should load.");

		assert_eq!(config, ProxyConfig::default());
		assert!(config.defaults.secret_key.is_none());
		assert!(config.defaults.shared_key.is_none());
		assert!(config.defaults.organization.is_none());
		assert_eq!(config.base_url.as_str(), "https://api.ncr.com/");
	}

	#[test]
	fn lookup_populates_every_field_and_ignores_blanks() {
		let config = ProxyConfig::from_lookup(lookup(&[
			(ENV_SECRET_KEY, "op-secret"),
			(ENV_SHARED_KEY, "op-shared"),
			(ENV_ORGANIZATION, "  "),
			(ENV_BASE_URL, "http://127.0.0.1:8080"),
			(ENV_TIMEOUT_SECS, "15"),
		]))
		.expect("Populated lookup should load.");

		assert_eq!(
			config.defaults.secret_key.as_ref().map(Secret::expose),
			Some("op-secret")
		);
		assert_eq!(config.defaults.shared_key.as_deref(), Some("op-shared"));
		assert!(config.defaults.organization.is_none());
		assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
		assert_eq!(config.request_timeout, Some(Duration::seconds(15)));
	}

	#[test]
	fn rejects_bad_url_and_timeout() {
		let err = ProxyConfig::from_lookup(lookup(&[(ENV_BASE_URL, "not a url")]))
			.expect_err("Relative base URL should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidEndpoint { .. })));

		let err = ProxyConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")]))
			.expect_err("Zero timeout should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidTimeout { .. })));
	}

	#[test]
	fn deserializes_from_json_with_defaults() {
		let config: ProxyConfig = serde_json::from_str(
			r#"{"defaults":{"sharedKey":"json-shared","organization":"json-org"}}"#,
		)
		.expect("Config JSON should deserialize.");

		assert_eq!(config.base_url.as_str(), "https://api.ncr.com/");
		assert_eq!(config.defaults.shared_key.as_deref(), Some("json-shared"));
		assert!(config.defaults.secret_key.is_none());
	}

	#[test]
	fn debug_does_not_print_secrets() {
		let defaults =
			OperatorDefaults::default().with_secret_key("hidden").with_shared_key("also");
		let rendered = format!("{defaults:?}");

		assert!(!rendered.contains("hidden"));
		assert!(!rendered.contains("also"));
	}
}
