// self
use crate::obs::{DispatchOutcome, Operation};

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_dispatch_outcome(operation: Operation, outcome: DispatchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"accesskey_proxy_dispatch_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_dispatch_outcome_noop_without_recorder() {
		record_dispatch_outcome(Operation::LookupRoles, DispatchOutcome::Failure);
	}
}
