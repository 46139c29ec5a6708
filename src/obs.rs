//! Optional observability helpers for dispatch operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `accesskey_proxy.dispatch` with the
//!   `operation` and `organization` fields, plus a `warn` event for every failure.
//! - Enable `metrics` to increment the `accesskey_proxy_dispatch_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.
//!
//! Neither helper ever records credential material.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Upstream operations performed by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// POST to the token-issuance endpoint.
	IssueToken,
	/// GET against the role-lookup endpoint.
	LookupRoles,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::IssueToken => "issue_token",
			Operation::LookupRoles => "lookup_roles",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
	/// Entry to a dispatcher operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl DispatchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DispatchOutcome::Attempt => "attempt",
			DispatchOutcome::Success => "success",
			DispatchOutcome::Failure => "failure",
		}
	}
}
impl Display for DispatchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
