//! Remote gate confirmation.
//!
//! When a requested gate had to be matched fuzzily, the ATC service is told
//! which gate was actually picked so its clearances agree with the ground.

use std::time::Duration;

use crate::config::Api;

/// Errors raised while confirming a gate.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error("no API key configured")]
    MissingKey,

    #[error("confirmation rejected with status {0}")]
    Status(u16),

    #[error("confirmation request failed: {0}")]
    Transport(String),
}

/// Something that can be told which gate was picked.
pub trait GateConfirmation: Send {
    fn confirm(&self, airport: &str, gate: &str) -> Result<(), ConfirmError>;
}

/// Confirms gates over HTTP.
pub struct HttpConfirmer {
    agent: ureq::Agent,
    url: String,
    api_key: String,
}

impl HttpConfirmer {
    pub fn new(api: &Api) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(api.timeout_ms)))
            .build()
            .new_agent();
        Self {
            agent,
            url: api.confirm_url.clone(),
            api_key: api.api_key.clone(),
        }
    }
}

impl GateConfirmation for HttpConfirmer {
    fn confirm(&self, airport: &str, gate: &str) -> Result<(), ConfirmError> {
        if self.api_key.is_empty() {
            return Err(ConfirmError::MissingKey);
        }
        tracing::debug!("confirming gate {gate} at {airport}");
        match self
            .agent
            .get(&self.url)
            .query("api_key", &self.api_key)
            .query("gate", gate)
            .query("airport", airport)
            .call()
        {
            Ok(_) => {
                tracing::info!("requested gate {gate} at {airport} from the ATC service");
                Ok(())
            }
            Err(ureq::Error::StatusCode(status)) => Err(ConfirmError::Status(status)),
            Err(e) => Err(ConfirmError::Transport(e.to_string())),
        }
    }
}
