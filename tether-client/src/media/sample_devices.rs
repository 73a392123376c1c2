use crate::error::MediaError;
use crate::media::{LocalStream, LocalTrack, MediaDevices};
use async_trait::async_trait;
use std::sync::Arc;
use tether_core::{MediaConstraints, TrackKind};
use tracing::{info, warn};
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// [`MediaDevices`] that hands out `webrtc` static-sample tracks (opus audio,
/// VP8 video). Nothing is captured; the tracks exist so that a real transport
/// can negotiate media sections for them.
pub struct SampleMediaDevices {
    granted: bool,
}

impl SampleMediaDevices {
    pub fn new() -> Self {
        Self {
            granted: true,
        }
    }

    /// Devices that refuse every capture request.
    pub fn denied() -> Self {
        Self {
            granted: false,
        }
    }
}

impl Default for SampleMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_track(kind: TrackKind, stream_id: &str) -> LocalTrack {
    let (mime_type, clock_rate, channels) = match kind {
        TrackKind::Audio => (MIME_TYPE_OPUS, 48000, 2),
        TrackKind::Video => (MIME_TYPE_VP8, 90000, 0),
    };

    let rtc = TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            clock_rate,
            channels,
            ..Default::default()
        },
        kind.to_string(),
        stream_id.to_owned(),
    );
    LocalTrack::with_rtc_track(kind, Arc::new(rtc))
}

#[async_trait]
impl MediaDevices for SampleMediaDevices {
    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<LocalStream, MediaError> {
        if !self.granted {
            warn!("Capture request refused");
            return Err(MediaError::Denied);
        }

        let stream_id = Uuid::new_v4().to_string();
        let tracks: Vec<LocalTrack> = constraints
            .kinds()
            .into_iter()
            .map(|kind| sample_track(kind, &stream_id))
            .collect();

        info!(
            "Captured stream {} with {} track(s) (echo cancellation: {}, noise suppression: {})",
            stream_id,
            tracks.len(),
            constraints.audio.echo_cancellation,
            constraints.audio.noise_suppression
        );
        Ok(LocalStream::new(stream_id, tracks))
    }
}
