//! Stub transport shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::{OffsetDateTime, macros::datetime};
// self
use accesskey_proxy::{
	auth::Credentials,
	dispatch::{Endpoints, RequestDispatcher},
	http::{HttpFuture, OutboundRequest, ProxyHttpClient, RawResponse},
	url::Url,
};

pub const SECRET_KEY: &str = "s3cr3t";
pub const SHARED_KEY: &str = "shared-key";
pub const ORGANIZATION: &str = "test-org";
pub const BASE_URL: &str = "https://api.ncr.com";

/// Known-answer digest for POST `/security/security-tokens` at [`fixed_instant`].
pub const TOKEN_DIGEST: &str =
	"qIV1U0K1t/idarURSMmb/3iJgyPz0UmF3SZSInB5O42ecTg/8KzEJz5LWvx0sb+leew7yQzCxbIwBMH2BXYWcw==";
/// Known-answer digest for GET of the role endpoint at [`fixed_instant`].
pub const ROLES_DIGEST: &str =
	"/AnjQOeHiIB7/HBx2BFH7daYSqacz+cwzRn9xF65EkQaCy/oQDFN1Bzd6OvCfeoh++hsqPa/Juquua2kkGEsUA==";

#[derive(Debug)]
pub enum StubTransportError {
	ConnectionRefused,
}
impl Display for StubTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionRefused => write!(f, "Connection refused."),
		}
	}
}
impl StdError for StubTransportError {}

/// Replies with a canned response (or a transport failure) and records every request.
#[derive(Clone, Default)]
pub struct StubHttpClient {
	reply: Option<RawResponse>,
	sent: Arc<Mutex<Vec<OutboundRequest>>>,
}
impl StubHttpClient {
	pub fn responding(status: u16, body: &str) -> Self {
		Self { reply: Some(RawResponse::new(status, body)), sent: Default::default() }
	}

	pub fn unreachable() -> Self {
		Self::default()
	}

	pub fn sent(&self) -> Vec<OutboundRequest> {
		self.sent.lock().clone()
	}
}
impl ProxyHttpClient for StubHttpClient {
	type TransportError = StubTransportError;

	fn send(&self, request: OutboundRequest) -> HttpFuture<'_, Self::TransportError> {
		self.sent.lock().push(request);

		let reply = self.reply.clone().ok_or(StubTransportError::ConnectionRefused);

		Box::pin(async move { reply })
	}
}

pub fn credentials() -> Credentials {
	Credentials::new(SECRET_KEY, SHARED_KEY, ORGANIZATION)
		.expect("Credential fixture should be valid.")
}

pub fn endpoints() -> Endpoints {
	Endpoints::from_base(&Url::parse(BASE_URL).expect("Base URL fixture should parse."))
		.expect("Endpoints should derive from the base URL fixture.")
}

pub fn dispatcher(stub: &StubHttpClient) -> RequestDispatcher<StubHttpClient> {
	RequestDispatcher::new(stub.clone(), endpoints())
}

/// Friday, 5 January 2024, 09:03:07.456 UTC.
pub fn fixed_instant() -> OffsetDateTime {
	datetime!(2024-01-05 09:03:07.456 UTC)
}
