//! Inbound verb routing.
//!
//! `POST` issues a token using credentials from a JSON body, falling back to the operator
//! defaults for any field the body leaves out. `GET` looks up roles using credentials from the
//! query string, all three of which are required. Every other verb is rejected before any
//! signing or network work happens.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	config::OperatorDefaults,
	dispatch::RequestDispatcher,
	error::InputError,
	http::ProxyHttpClient,
	obs::{self, Operation},
	signing::HttpMethod,
};
#[cfg(feature = "reqwest")] use crate::{config::ProxyConfig, http::ReqwestHttpClient};

/// Value of `status` in a successful token response body.
pub const TOKEN_SUCCESS_STATUS: &str = "Success";

/// Inbound request as seen by the router; transport details are the caller's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundRequest {
	/// HTTP verb as received.
	pub verb: String,
	/// Decoded query parameters in arrival order.
	pub query: Vec<(String, String)>,
	/// Raw request body, if one was sent.
	pub body: Option<String>,
}
impl InboundRequest {
	/// Creates a request with the given verb and nothing else.
	pub fn new(verb: impl Into<String>) -> Self {
		Self { verb: verb.into(), ..Default::default() }
	}

	/// `GET` with a raw (still percent-encoded) query string; a leading `?` is ignored.
	pub fn get(query_string: &str) -> Self {
		Self::new(HttpMethod::Get.as_str()).with_query_string(query_string)
	}

	/// `POST` with a raw body.
	pub fn post(body: impl Into<String>) -> Self {
		Self { body: Some(body.into()), ..Self::new(HttpMethod::Post.as_str()) }
	}

	/// Replaces the query parameters by decoding `query_string`.
	pub fn with_query_string(mut self, query_string: &str) -> Self {
		let raw = query_string.strip_prefix('?').unwrap_or(query_string);

		self.query = form_urlencoded::parse(raw.as_bytes()).into_owned().collect();

		self
	}

	/// First non-empty value for `name`.
	pub fn query_param(&self, name: &str) -> Option<&str> {
		self.query
			.iter()
			.find(|(key, value)| key == name && !value.is_empty())
			.map(|(_, value)| value.as_str())
	}
}

/// Response body variants; serialized without a tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
	/// Token issued.
	Token {
		/// Issued token.
		token: String,
		/// Always [`TOKEN_SUCCESS_STATUS`].
		status: String,
	},
	/// Roles found.
	Roles {
		/// Role names in upstream order.
		rolename: Vec<String>,
		/// Token echoed by upstream, if any.
		token: Option<String>,
		/// Upstream HTTP status.
		status: u16,
	},
	/// Generic failure message.
	Error {
		/// Caller-facing message.
		error: String,
	},
}

/// Status and body to send back to the inbound caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
	/// HTTP status.
	pub status: u16,
	/// JSON body.
	pub body: ResponseBody,
}
impl Outcome {
	/// Converts an error into a generic response without leaking its details.
	pub fn failure(err: &Error) -> Self {
		let kind = err.kind();

		Self {
			status: kind.status_code(),
			body: ResponseBody::Error { error: kind.public_message().to_owned() },
		}
	}

	/// Serializes the body as JSON.
	pub fn body_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(&self.body)
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequestBody {
	#[serde(default)]
	secret_key: Option<String>,
	#[serde(default)]
	shared_key: Option<String>,
	#[serde(default)]
	nep_organization: Option<String>,
}

/// Stateless router that validates inbound parameters and hands off to the dispatcher.
pub struct Router<C>
where
	C: ?Sized + ProxyHttpClient,
{
	dispatcher: RequestDispatcher<C>,
	defaults: OperatorDefaults,
}
impl<C> Router<C>
where
	C: ?Sized + ProxyHttpClient,
{
	/// Creates a router around `dispatcher` with operator credential fallbacks.
	pub fn new(dispatcher: RequestDispatcher<C>, defaults: OperatorDefaults) -> Self {
		Self { dispatcher, defaults }
	}

	/// Dispatcher used for upstream calls.
	pub fn dispatcher(&self) -> &RequestDispatcher<C> {
		&self.dispatcher
	}

	/// Routes `request`, returning a generic error response on failure.
	pub async fn respond(&self, request: &InboundRequest) -> Outcome {
		match self.handle(request).await {
			Ok(outcome) => outcome,
			Err(err) => Outcome::failure(&err),
		}
	}

	/// Routes `request` and surfaces the typed error on failure.
	pub async fn handle(&self, request: &InboundRequest) -> Result<Outcome> {
		let method = request
			.verb
			.parse::<HttpMethod>()
			.inspect_err(|err| obs::log_failure(None, None, err))?;

		match method {
			HttpMethod::Post => self.issue_token(request).await,
			HttpMethod::Get => self.lookup_roles(request).await,
		}
	}

	async fn issue_token(&self, request: &InboundRequest) -> Result<Outcome> {
		let credentials = self
			.body_credentials(request.body.as_deref())
			.inspect_err(|err| obs::log_failure(Some(Operation::IssueToken), None, err))?;
		// The dispatcher rejects a missing or empty token.
		let result = self.dispatcher.issue_token(&credentials).await?;

		Ok(Outcome {
			status: 200,
			body: ResponseBody::Token {
				token: result.token.unwrap_or_default(),
				status: TOKEN_SUCCESS_STATUS.to_owned(),
			},
		})
	}

	async fn lookup_roles(&self, request: &InboundRequest) -> Result<Outcome> {
		let credentials = query_credentials(request)
			.inspect_err(|err| obs::log_failure(Some(Operation::LookupRoles), None, err))?;
		let result = self.dispatcher.lookup_roles(&credentials).await?;

		Ok(Outcome {
			status: 200,
			body: ResponseBody::Roles {
				rolename: result.role_names.unwrap_or_default(),
				token: result.token,
				status: result.status_code,
			},
		})
	}

	fn body_credentials(&self, body: Option<&str>) -> Result<Credentials> {
		let raw = body.filter(|raw| !raw.trim().is_empty()).ok_or(InputError::MissingBody)?;
		let mut deserializer = serde_json::Deserializer::from_str(raw);
		// Derived struct impls also accept positional arrays; only an object is a valid body.
		let object: serde_json::Map<String, serde_json::Value> =
			serde_path_to_error::deserialize(&mut deserializer)
				.map_err(InputError::malformed_body)?;
		let parsed: TokenRequestBody =
			serde_path_to_error::deserialize(serde_json::Value::Object(object))
				.map_err(InputError::malformed_body)?;
		let defaults = &self.defaults;

		Credentials::new(
			or_default(parsed.secret_key, defaults.secret_key.as_ref().map(Secret::expose)),
			or_default(parsed.shared_key, defaults.shared_key.as_deref()),
			or_default(parsed.nep_organization, defaults.organization.as_deref()),
		)
	}
}
#[cfg(feature = "reqwest")]
impl Router<ReqwestHttpClient> {
	/// Builds a reqwest-backed router from startup configuration.
	pub fn from_config(config: &ProxyConfig) -> Result<Self> {
		Ok(Self::new(RequestDispatcher::from_config(config)?, config.defaults.clone()))
	}
}
impl<C> Debug for Router<C>
where
	C: ?Sized + ProxyHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Router")
			.field("dispatcher", &self.dispatcher)
			.field("defaults", &self.defaults)
			.finish()
	}
}

fn query_credentials(request: &InboundRequest) -> Result<Credentials> {
	let field = |name: &'static str| {
		request.query_param(name).ok_or(InputError::MissingField { field: name })
	};

	Credentials::new(
		field(Credentials::SECRET_KEY_FIELD)?,
		field(Credentials::SHARED_KEY_FIELD)?,
		field(Credentials::ORGANIZATION_FIELD)?,
	)
}

fn or_default(given: Option<String>, fallback: Option<&str>) -> String {
	match given {
		Some(value) if !value.is_empty() => value,
		_ => fallback.unwrap_or_default().to_owned(),
	}
}
