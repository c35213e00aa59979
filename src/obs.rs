//! Spans and counters around token exchanges and API calls.
//!
//! With the `tracing` feature each operation runs inside an `itau_pix.op` span carrying `op`
//! and `stage`. With the `metrics` feature the `itau_pix_operation_total` counter is bumped
//! per attempt and outcome, labeled by `op` and `outcome`. Without either feature the wrapper
//! only awaits the operation.

// self
use crate::{_prelude::*, auth::AuthVariant};

/// Operation kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// JWT-bearer token exchange.
	JwtBearer,
	/// Client-secret token exchange.
	ClientSecret,
	/// Authenticated Pix API call.
	ApiCall,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::JwtBearer => "jwt_bearer",
			OperationKind::ClientSecret => "client_secret",
			OperationKind::ApiCall => "api_call",
		}
	}
}
impl From<&AuthVariant> for OperationKind {
	fn from(variant: &AuthVariant) -> Self {
		match variant {
			AuthVariant::JwtBearer { .. } => Self::JwtBearer,
			AuthVariant::ClientSecret { .. } => Self::ClientSecret,
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Awaits `fut` as one observed operation.
pub(crate) async fn observe<T, Fut>(
	kind: OperationKind,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	count(kind, OperationOutcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(tracing::info_span!("itau_pix.op", op = kind.as_str(), stage)).await
	};
	#[cfg(not(feature = "tracing"))]
	let result = {
		let _ = stage;

		fut.await
	};

	let outcome =
		if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure };

	count(kind, outcome);

	result
}

fn count(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"itau_pix_operation_total",
		"op" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
