//! Proxy-level error types shared across signing, dispatch, and routing.

// self
use crate::_prelude::*;

/// Proxy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type BodyParseError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical proxy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied a missing or malformed parameter.
	#[error(transparent)]
	Input(#[from] InputError),
	/// Upstream could not be reached (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream answered without a usable token or role list.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),

	/// Request instant could not be rendered for signing.
	#[error("Request timestamp could not be formatted.")]
	Timestamp(#[from] time::error::Format),
	/// Inbound verb is neither GET nor POST.
	#[error("HTTP method `{verb}` is not supported.")]
	UnsupportedMethod {
		/// Verb as received from the caller.
		verb: String,
	},
}
impl Error {
	/// Classifies the error into the coarse taxonomy callers respond with.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Config,
			Self::Input(_) => ErrorKind::BadInput,
			Self::Timestamp(_) => ErrorKind::Internal,
			Self::Transport(_) => ErrorKind::TransportFailure,
			Self::Upstream(_) => ErrorKind::UpstreamFailure,
			Self::UnsupportedMethod { .. } => ErrorKind::UnsupportedMethod,
		}
	}

	/// HTTP status reported to the inbound caller.
	pub fn status_code(&self) -> u16 {
		self.kind().status_code()
	}
}

/// Coarse error classification used for responses, logs, and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Missing or empty required field.
	BadInput,
	/// Network or connection failure calling upstream.
	TransportFailure,
	/// Upstream reachable but returned no usable token or content.
	UpstreamFailure,
	/// Verb other than GET or POST.
	UnsupportedMethod,
	/// Proxy misconfiguration.
	Config,
	/// Local failure while preparing the outbound request.
	Internal,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::BadInput => "bad_input",
			ErrorKind::TransportFailure => "transport_failure",
			ErrorKind::UpstreamFailure => "upstream_failure",
			ErrorKind::UnsupportedMethod => "unsupported_method",
			ErrorKind::Config => "config",
			ErrorKind::Internal => "internal",
		}
	}

	/// HTTP status associated with the kind.
	pub const fn status_code(self) -> u16 {
		match self {
			ErrorKind::BadInput | ErrorKind::UnsupportedMethod => 400,
			ErrorKind::TransportFailure
			| ErrorKind::UpstreamFailure
			| ErrorKind::Config
			| ErrorKind::Internal => 500,
		}
	}

	/// Generic caller-facing message; never carries upstream or credential detail.
	pub const fn public_message(self) -> &'static str {
		match self {
			ErrorKind::BadInput => "Required parameters are missing or invalid.",
			ErrorKind::TransportFailure => "Upstream service could not be reached.",
			ErrorKind::UpstreamFailure => "Upstream service did not return a usable response.",
			ErrorKind::UnsupportedMethod => "HTTP method is not supported.",
			ErrorKind::Config => "Proxy is not configured correctly.",
			ErrorKind::Internal => "Request could not be prepared.",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or derived endpoint cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot carry a path (e.g. `mailto:`).
	#[error("Base URL `{url}` cannot be used as an HTTP endpoint base.")]
	UnusableBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Timeout setting is not a positive integer number of seconds.
	#[error("Request timeout `{value}` must be a positive number of seconds.")]
	InvalidTimeout {
		/// Raw configured value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Missing or malformed inbound parameters.
#[derive(Debug, ThisError)]
pub enum InputError {
	/// POST arrived without a body.
	#[error("Request body is required.")]
	MissingBody,
	/// POST body is not the expected JSON object.
	#[error("Request body is not valid JSON at `{path}`.")]
	MalformedBody {
		/// JSON path where parsing failed.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: BodyParseError,
	},
	/// A required credential field is absent or empty.
	#[error("Required field `{field}` is missing or empty.")]
	MissingField {
		/// Wire name of the field.
		field: &'static str,
	},
}
impl InputError {
	pub(crate) fn malformed_body(source: BodyParseError) -> Self {
		Self::MalformedBody { path: source.path().to_string(), source }
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Upstream answered, but not with something the proxy can use.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Token endpoint returned an empty or missing `token`.
	#[error("Token endpoint did not issue a token (HTTP {status}).")]
	TokenNotIssued {
		/// HTTP status returned by upstream.
		status: u16,
	},
	/// Response body could not be parsed into the expected shape.
	#[error("Upstream returned an unparseable response (HTTP {status}).")]
	UnparseableResponse {
		/// HTTP status returned by upstream.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: BodyParseError,
	},
}
