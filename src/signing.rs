//! AccessKey request signing.
//!
//! The canonical string is the HTTP method, the URL's path and query, and then each present
//! optional header value in a fixed order, joined with `\n`:
//!
//! ```text
//! METHOD
//! /path?query
//! content-type
//! content-md5
//! application-key
//! correlation-id
//! organization
//! service-version
//! ```
//!
//! Absent or empty headers are skipped entirely; later values move up rather than leaving a
//! blank line. The digest is `base64(HMAC-SHA512(secret_key + secret_date, canonical))`, where
//! `secret_date` is the request instant rendered as `yyyy-MM-ddTHH:mm:ss.000Z` in UTC.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use time::{UtcOffset, macros::format_description};
// self
use crate::{_prelude::*, auth::Credentials};

type HmacSha512 = Hmac<Sha512>;

/// Prefix placed before the serialized [`Signature`] in the `Authorization` header.
pub const AUTHORIZATION_SCHEME: &str = "AccessKey";

/// Outbound HTTP verbs the proxy signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
}
impl HttpMethod {
	/// Upper-case wire form used in the canonical string.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("GET") {
			Ok(Self::Get)
		} else if s.eq_ignore_ascii_case("POST") {
			Ok(Self::Post)
		} else {
			Err(Error::UnsupportedMethod { verb: s.to_owned() })
		}
	}
}

/// Optional header values that participate in the canonical string.
///
/// Only `content_type` and `organization` are populated by the dispatcher today; the rest are
/// extension points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalHeaders {
	/// `Content-Type` value.
	pub content_type: Option<String>,
	/// `Content-MD5` value.
	pub content_md5: Option<String>,
	/// Application key header value.
	pub application_key: Option<String>,
	/// Correlation identifier header value.
	pub correlation_id: Option<String>,
	/// `nep-organization` value.
	pub organization: Option<String>,
	/// Service version header value.
	pub service_version: Option<String>,
}
impl CanonicalHeaders {
	/// All slots in canonical order, present or not.
	pub fn ordered(&self) -> [(&'static str, Option<&str>); 6] {
		[
			("content-type", self.content_type.as_deref()),
			("content-md5", self.content_md5.as_deref()),
			("application-key", self.application_key.as_deref()),
			("correlation-id", self.correlation_id.as_deref()),
			("organization", self.organization.as_deref()),
			("service-version", self.service_version.as_deref()),
		]
	}

	/// Non-empty values in canonical order; these become the trailing canonical lines.
	pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
		self.ordered().into_iter().filter_map(|(_, value)| value.filter(|v| !v.is_empty()))
	}
}

/// Everything the signer needs to know about one outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequestSpec {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Instant the request is made; shared with the `date` header.
	pub timestamp: OffsetDateTime,
	/// Optional canonical header values.
	pub headers: CanonicalHeaders,
}
impl SignedRequestSpec {
	/// Creates a spec with no optional headers. The timestamp is normalized to UTC.
	pub fn new(method: HttpMethod, url: Url, timestamp: OffsetDateTime) -> Self {
		Self {
			method,
			url,
			timestamp: timestamp.to_offset(UtcOffset::UTC),
			headers: CanonicalHeaders::default(),
		}
	}

	/// Sets the `Content-Type` slot.
	pub fn content_type(mut self, value: impl Into<String>) -> Self {
		self.headers.content_type = Some(value.into());

		self
	}

	/// Sets the organization slot.
	pub fn organization(mut self, value: impl Into<String>) -> Self {
		self.headers.organization = Some(value.into());

		self
	}

	/// Replaces every optional header slot at once.
	pub fn headers(mut self, headers: CanonicalHeaders) -> Self {
		self.headers = headers;

		self
	}

	/// Path plus query string, without scheme or host. An empty query adds no `?`.
	pub fn path_and_query(&self) -> String {
		let path = self.url.path();

		match self.url.query() {
			Some(query) if !query.is_empty() => format!("{path}?{query}"),
			_ => path.to_owned(),
		}
	}
}

/// Serialized as `<shared_key>:<base64 digest>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
	/// Shared key echoed in front of the digest.
	pub shared_key_prefix: String,
	/// Base64 HMAC-SHA512 digest.
	pub digest_base64: String,
}
impl Signature {
	/// Full `Authorization` header value, `AccessKey <shared>:<digest>`.
	pub fn authorization_header(&self) -> String {
		format!("{AUTHORIZATION_SCHEME} {self}")
	}
}
impl Display for Signature {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}:{}", self.shared_key_prefix, self.digest_base64)
	}
}

/// Signs `spec` with `credentials`. Pure and deterministic.
pub fn sign(credentials: &Credentials, spec: &SignedRequestSpec) -> Result<Signature> {
	let one_time_secret =
		format!("{}{}", credentials.secret_key().expose(), format_secret_date(spec.timestamp)?);
	let to_sign = canonical_string(spec);
	let mut mac = HmacSha512::new_from_slice(one_time_secret.as_bytes())
		.expect("HMAC can accept keys of any length");

	mac.update(to_sign.as_bytes());

	Ok(Signature {
		shared_key_prefix: credentials.shared_key().to_owned(),
		digest_base64: BASE64.encode(mac.finalize().into_bytes()),
	})
}

/// Builds the newline-joined string that gets signed.
pub fn canonical_string(spec: &SignedRequestSpec) -> String {
	let path_and_query = spec.path_and_query();
	let mut lines = vec![spec.method.as_str(), path_and_query.as_str()];

	lines.extend(spec.headers.lines());

	lines.join("\n")
}

/// Renders the instant mixed into the HMAC key: `yyyy-MM-ddTHH:mm:ss.000Z` in UTC.
pub fn format_secret_date(timestamp: OffsetDateTime) -> Result<String> {
	let utc = timestamp.to_offset(UtcOffset::UTC);

	Ok(utc.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].000Z"))?)
}

/// Renders the `date` header: `EEE, dd MMM yyyy HH:mm:ss GMT` in UTC.
pub fn format_http_date(timestamp: OffsetDateTime) -> Result<String> {
	let utc = timestamp.to_offset(UtcOffset::UTC);

	Ok(utc.format(format_description!(
		"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
	))?)
}
