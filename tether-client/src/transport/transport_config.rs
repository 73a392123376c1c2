use serde::Deserialize;
use tether_core::IceServerConfig;

/// ICE configuration handed to every new transport endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}

impl TransportConfig {
    /// Host candidates only. Enough for two endpoints on the same machine.
    pub fn local_only() -> Self {
        Self {
            ice_servers: Vec::new(),
        }
    }
}
