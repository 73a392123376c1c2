use crate::error::MediaError;
use crate::media::LocalStream;
use async_trait::async_trait;
use tether_core::MediaConstraints;

/// Camera and microphone capability.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Captures one stream satisfying `constraints`, or [`MediaError::Denied`]
    /// when the platform refuses permission.
    async fn get_user_media(&self, constraints: &MediaConstraints)
    -> Result<LocalStream, MediaError>;
}
