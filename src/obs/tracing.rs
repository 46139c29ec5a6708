// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedDispatch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedDispatch<F> = F;

/// A span builder used by dispatcher operations.
#[derive(Clone, Debug)]
pub struct DispatchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl DispatchSpan {
	/// Creates a new span tagged with the operation and the caller's organization.
	pub fn new(operation: Operation, organization: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"accesskey_proxy.dispatch",
				operation = operation.as_str(),
				organization
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, organization);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedDispatch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a completed dispatch at `debug`.
pub fn log_success(operation: Operation, organization: &str, status: u16) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		operation = operation.as_str(),
		organization,
		status,
		"Upstream call succeeded."
	);
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, organization, status);
	}
}

/// Logs a failed dispatch or routing step at `warn`.
///
/// Only the error's `Display` output is recorded; error messages in this crate name fields,
/// never their values.
pub fn log_failure(operation: Option<Operation>, organization: Option<&str>, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		operation = operation.map(Operation::as_str),
		organization,
		kind = err.kind().as_str(),
		error = %err,
		"Request failed."
	);
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, organization, err);
	}
}
