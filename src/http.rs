//! Transport primitives for signed upstream calls.
//!
//! [`ProxyHttpClient`] is the proxy's only dependency on an HTTP stack: hand it a method, URL,
//! headers, and body, get back a status and body. The dispatcher owns the client behind an
//! `Arc` and never reaches for a global instance, so tests can substitute a stub that records
//! what was sent.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, signing::HttpMethod};
#[cfg(feature = "reqwest")] use crate::{config::ProxyConfig, error::ConfigError};

/// Boxed future returned by [`ProxyHttpClient::send`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<RawResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing one signed upstream call.
///
/// Implementations must return non-2xx responses as [`RawResponse`] values; the `Err` branch
/// is reserved for failures where no response arrived at all.
pub trait ProxyHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with the raw upstream response.
	fn send(&self, request: OutboundRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Fully signed request ready for the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Absolute endpoint URL.
	pub url: Url,
	/// Header name/value pairs in send order.
	pub headers: Vec<(&'static str, String)>,
	/// Request body; empty for both endpoints.
	pub body: Vec<u8>,
}
impl OutboundRequest {
	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for OutboundRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let names = self.headers.iter().map(|(name, _)| *name).collect::<Vec<_>>();

		f.debug_struct("OutboundRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &names)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Status and body returned by upstream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Builds a response from a status and any byte-like body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Upstream endpoints answer directly, so redirects are not followed. Configure any custom
/// [`ReqwestClient`] passed to [`ReqwestHttpClient::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout with redirects disabled.
	pub fn from_config(config: &ProxyConfig) -> Result<Self> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = config.request_timeout {
			let timeout = std::time::Duration::try_from(timeout).map_err(|_| {
				ConfigError::InvalidTimeout { value: timeout.whole_seconds().to_string() }
			})?;

			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build().map_err(ConfigError::from)?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProxyHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn send(&self, request: OutboundRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method.into(), request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response = builder.body(request.body).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}

#[cfg(feature = "reqwest")]
impl From<HttpMethod> for reqwest::Method {
	fn from(method: HttpMethod) -> Self {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
		}
	}
}
