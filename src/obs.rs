//! Optional observability helpers for login attempts.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `custom_oauth2.login` with the
//!   `stage` field, plus the handler log events.
//! - Enable `metrics` to increment the `custom_oauth2_login_total` counter for every
//!   attempt/success/failure/skip, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing` event when the `tracing` feature is enabled; compiles to nothing otherwise.
macro_rules! log_event {
	($level:ident, $($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!($($arg)+);
		}
	}};
}
pub(crate) use log_event;

/// Login stages observed by the handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginStage {
	/// Start route building the authorization redirect.
	Start,
	/// Callback exchanging the code and fetching the profile.
	Exchange,
	/// Callback forwarding the identity to the account service.
	Link,
}
impl LoginStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginStage::Start => "start",
			LoginStage::Exchange => "exchange",
			LoginStage::Link => "link",
		}
	}
}
impl Display for LoginStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure handled by a redirect or swallowed after logging.
	Failure,
	/// Stage intentionally did nothing (profile without an email).
	Skipped,
}
impl LoginOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginOutcome::Attempt => "attempt",
			LoginOutcome::Success => "success",
			LoginOutcome::Failure => "failure",
			LoginOutcome::Skipped => "skipped",
		}
	}
}
impl Display for LoginOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
