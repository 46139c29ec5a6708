//! Per-request AccessKey credentials.

// self
use crate::{_prelude::*, auth::Secret, error::InputError};

/// Secret key, shared key, and organization used to sign one outbound call.
///
/// All three fields are validated as non-empty on construction, so a value of this type is
/// always ready for signing. The `Debug` impl prints the organization only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	secret_key: Secret,
	shared_key: String,
	organization: String,
}
impl Credentials {
	/// Wire name of the secret key parameter.
	pub const SECRET_KEY_FIELD: &'static str = "secretKey";
	/// Wire name of the shared key parameter.
	pub const SHARED_KEY_FIELD: &'static str = "sharedKey";
	/// Wire name of the organization parameter.
	pub const ORGANIZATION_FIELD: &'static str = "nepOrganization";

	/// Builds credentials, rejecting any empty component.
	pub fn new(
		secret_key: impl Into<String>,
		shared_key: impl Into<String>,
		organization: impl Into<String>,
	) -> Result<Self> {
		let secret_key = Secret::new(secret_key);
		let shared_key = shared_key.into();
		let organization = organization.into();

		if secret_key.is_empty() {
			return Err(InputError::MissingField { field: Self::SECRET_KEY_FIELD }.into());
		}
		if shared_key.is_empty() {
			return Err(InputError::MissingField { field: Self::SHARED_KEY_FIELD }.into());
		}
		if organization.is_empty() {
			return Err(InputError::MissingField { field: Self::ORGANIZATION_FIELD }.into());
		}

		Ok(Self { secret_key, shared_key, organization })
	}

	/// Secret half of the key pair. Never log it.
	pub fn secret_key(&self) -> &Secret {
		&self.secret_key
	}

	/// Public half of the key pair, echoed in the `Authorization` header.
	pub fn shared_key(&self) -> &str {
		&self.shared_key
	}

	/// Organization the request is made on behalf of.
	pub fn organization(&self) -> &str {
		&self.organization
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("secret_key", &self.secret_key)
			.field("shared_key", &"<redacted>")
			.field("organization", &self.organization)
			.finish()
	}
}
