//! Signed upstream calls for token issuance and role lookup.
//!
//! Each call captures `now` exactly once; the same instant feeds the `date` header and the
//! HMAC key so the upstream can recompute the signature from what it receives.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::{ConfigError, TransportError, UpstreamError},
	http::{OutboundRequest, ProxyHttpClient, RawResponse},
	obs::{self, DispatchOutcome, DispatchSpan, Operation},
	signing::{self, HttpMethod, SignedRequestSpec},
};
#[cfg(feature = "reqwest")] use crate::{config::ProxyConfig, http::ReqwestHttpClient};

/// Path of the token-issuance endpoint.
pub const TOKEN_PATH: &str = "/security/security-tokens";
/// Path of the role-lookup endpoint.
pub const ROLES_PATH: &str = "/security/role-grants/user-grants/self/effective-roles";

const CONTENT_TYPE_JSON: &str = "application/json";
const HEADER_ORGANIZATION: &str = "nep-organization";
const HEADER_DATE: &str = "date";
const HEADER_AUTHORIZATION: &str = "authorization";
const HEADER_CONTENT_TYPE: &str = "content-type";

#[cfg(feature = "reqwest")]
/// Dispatcher specialized for the crate's default reqwest transport.
pub type ReqwestDispatcher = RequestDispatcher<ReqwestHttpClient>;

/// The two fixed upstream endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// Token-issuance endpoint (POST).
	pub token: Url,
	/// Role-lookup endpoint (GET).
	pub roles: Url,
}
impl Endpoints {
	/// Derives both endpoints from a scheme + host base URL.
	pub fn from_base(base: &Url) -> Result<Self> {
		if base.cannot_be_a_base() {
			return Err(ConfigError::UnusableBaseUrl { url: base.to_string() }.into());
		}

		let join = |path: &str| {
			base.join(path).map_err(|source| Error::from(ConfigError::InvalidEndpoint { source }))
		};

		Ok(Self { token: join(TOKEN_PATH)?, roles: join(ROLES_PATH)? })
	}

	/// Method and URL used for `operation`.
	pub fn route(&self, operation: Operation) -> (HttpMethod, &Url) {
		match operation {
			Operation::IssueToken => (HttpMethod::Post, &self.token),
			Operation::LookupRoles => (HttpMethod::Get, &self.roles),
		}
	}
}

/// Normalized result of one upstream call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult {
	/// HTTP status returned by upstream.
	pub status_code: u16,
	/// Token from the response body, if any.
	pub token: Option<String>,
	/// Role names from a role-lookup response.
	pub role_names: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	token: Option<String>,
}

#[derive(Deserialize)]
struct RolesResponse {
	#[serde(default)]
	token: Option<String>,
	content: Vec<RoleGrant>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleGrant {
	role_name: String,
}

/// Signs and sends requests to the upstream endpoints through an injected HTTP client.
pub struct RequestDispatcher<C>
where
	C: ?Sized + ProxyHttpClient,
{
	http_client: Arc<C>,
	endpoints: Endpoints,
}
impl<C> RequestDispatcher<C>
where
	C: ?Sized + ProxyHttpClient,
{
	/// Creates a dispatcher that reuses the caller-provided transport.
	pub fn new(http_client: impl Into<Arc<C>>, endpoints: Endpoints) -> Self {
		Self { http_client: http_client.into(), endpoints }
	}

	/// Endpoints this dispatcher targets.
	pub fn endpoints(&self) -> &Endpoints {
		&self.endpoints
	}

	/// Requests a new token for `credentials`, stamping the call with the current time.
	pub async fn issue_token(&self, credentials: &Credentials) -> Result<ApiResult> {
		self.issue_token_at(credentials, OffsetDateTime::now_utc()).await
	}

	/// Requests a new token, signing with the supplied instant.
	///
	/// An empty or missing `token` in the response is reported as
	/// [`UpstreamError::TokenNotIssued`], regardless of the HTTP status.
	pub async fn issue_token_at(
		&self,
		credentials: &Credentials,
		now: OffsetDateTime,
	) -> Result<ApiResult> {
		const OPERATION: Operation = Operation::IssueToken;

		observe(OPERATION, credentials.organization(), async move {
			let response = self.call(OPERATION, credentials, now).await?;
			let parsed: TokenResponse = parse_body(&response)?;

			match parsed.token.filter(|token| !token.is_empty()) {
				Some(token) => Ok(ApiResult {
					status_code: response.status,
					token: Some(token),
					role_names: None,
				}),
				None => Err(UpstreamError::TokenNotIssued { status: response.status }.into()),
			}
		})
		.await
	}

	/// Looks up the effective roles for `credentials`, stamping the call with the current time.
	pub async fn lookup_roles(&self, credentials: &Credentials) -> Result<ApiResult> {
		self.lookup_roles_at(credentials, OffsetDateTime::now_utc()).await
	}

	/// Looks up effective roles, signing with the supplied instant.
	///
	/// The response must carry a `content` array of `{ "roleName": ... }` objects.
	pub async fn lookup_roles_at(
		&self,
		credentials: &Credentials,
		now: OffsetDateTime,
	) -> Result<ApiResult> {
		const OPERATION: Operation = Operation::LookupRoles;

		observe(OPERATION, credentials.organization(), async move {
			let response = self.call(OPERATION, credentials, now).await?;
			let parsed: RolesResponse = parse_body(&response)?;

			Ok(ApiResult {
				status_code: response.status,
				token: parsed.token,
				role_names: Some(parsed.content.into_iter().map(|grant| grant.role_name).collect()),
			})
		})
		.await
	}

	/// Builds the signed request for `operation` without sending it.
	pub fn signed_request(
		&self,
		operation: Operation,
		credentials: &Credentials,
		now: OffsetDateTime,
	) -> Result<OutboundRequest> {
		let (method, url) = self.endpoints.route(operation);
		let spec = SignedRequestSpec::new(method, url.clone(), now)
			.content_type(CONTENT_TYPE_JSON)
			.organization(credentials.organization());
		let signature = signing::sign(credentials, &spec)?;
		let date = signing::format_http_date(spec.timestamp)?;

		Ok(OutboundRequest {
			method,
			url: spec.url,
			headers: vec![
				(HEADER_ORGANIZATION, credentials.organization().to_owned()),
				(HEADER_DATE, date),
				(HEADER_AUTHORIZATION, signature.authorization_header()),
				(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON.to_owned()),
			],
			body: Vec::new(),
		})
	}

	async fn call(
		&self,
		operation: Operation,
		credentials: &Credentials,
		now: OffsetDateTime,
	) -> Result<RawResponse> {
		let request = self.signed_request(operation, credentials, now)?;
		let response = self.http_client.send(request).await.map_err(TransportError::network)?;

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl RequestDispatcher<ReqwestHttpClient> {
	/// Builds a reqwest-backed dispatcher from startup configuration.
	pub fn from_config(config: &ProxyConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(config)?;

		Ok(Self::new(http_client, Endpoints::from_base(&config.base_url)?))
	}
}
impl<C> Clone for RequestDispatcher<C>
where
	C: ?Sized + ProxyHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), endpoints: self.endpoints.clone() }
	}
}
impl<C> Debug for RequestDispatcher<C>
where
	C: ?Sized + ProxyHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestDispatcher").field("endpoints", &self.endpoints).finish()
	}
}

async fn observe<Fut>(operation: Operation, organization: &str, fut: Fut) -> Result<ApiResult>
where
	Fut: Future<Output = Result<ApiResult>>,
{
	let span = DispatchSpan::new(operation, organization);

	obs::record_dispatch_outcome(operation, DispatchOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(api) => {
			obs::record_dispatch_outcome(operation, DispatchOutcome::Success);
			obs::log_success(operation, organization, api.status_code);
		},
		Err(err) => {
			obs::record_dispatch_outcome(operation, DispatchOutcome::Failure);
			obs::log_failure(Some(operation), Some(organization), err);
		},
	}

	result
}

fn parse_body<T>(response: &RawResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		UpstreamError::UnparseableResponse { status: response.status, source }.into()
	})
}
