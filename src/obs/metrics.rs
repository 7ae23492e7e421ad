// self
use crate::obs::{LoginOutcome, LoginStage};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_login_outcome(stage: LoginStage, outcome: LoginOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"custom_oauth2_login_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}
