use crate::transport::TransportConfig;
use serde::Deserialize;
use tether_core::utils::ROOMS_COLLECTION;
use tether_core::{CandidateSide, MediaConstraints};

/// Everything a [`crate::CallController`] needs besides its collaborators.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let config = tether_client::CallConfig::from_json(r#"{ "rooms_collection": "calls" }"#).unwrap();
/// assert_eq!(config.rooms_collection, "calls");
/// assert_eq!(config.caller_candidates, "callerCandidates");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    pub rooms_collection: String,
    pub caller_candidates: String,
    pub callee_candidates: String,
    pub media: MediaConstraints,
    pub transport: TransportConfig,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            rooms_collection: ROOMS_COLLECTION.to_owned(),
            caller_candidates: CandidateSide::Caller.collection_name().to_owned(),
            callee_candidates: CandidateSide::Callee.collection_name().to_owned(),
            media: MediaConstraints::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl CallConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn candidates_collection(&self, side: CandidateSide) -> &str {
        match side {
            CandidateSide::Caller => &self.caller_candidates,
            CandidateSide::Callee => &self.callee_candidates,
        }
    }
}
