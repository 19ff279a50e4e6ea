use anyhow::{Context, Result};
use base64::Engine;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::audio::{AudioFormat, AudioFrame};
use crate::error::RecognitionErrorKind;
use crate::recording::sample_to_i16;

use super::events::TranscriptEvent;
use super::provider::{RecognitionStream, TranscriptionProvider};

/// Audio frame message published to the recognizer
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub stream_id: String,
    pub sequence: u32,
    pub pcm: String, // Base64-encoded 16-bit PCM bytes
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp: String, // RFC3339 timestamp
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Transcript message received from the recognizer
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub stream_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    pub confidence: Option<f32>,
    /// Wire error tag; present on terminal failure
    pub error: Option<String>,
}

/// Streaming recognizer reached over NATS pub/sub.
///
/// Frames go out as base64 PCM on `audio.frame.<stream_id>`; partial and
/// final transcripts come back on `stt.text.>`, filtered by stream id.
pub struct NatsTranscriptionProvider {
    url: String,
}

impl NatsTranscriptionProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl TranscriptionProvider for NatsTranscriptionProvider {
    async fn begin(&self, format: AudioFormat) -> Result<RecognitionStream> {
        info!("Connecting to NATS at {}", self.url);

        let client = async_nats::connect(&self.url)
            .await
            .context("Failed to connect to NATS")?;

        let stream_id = format!("stream-{}", Uuid::new_v4());

        let mut subscriber = client
            .subscribe("stt.text.>")
            .await
            .context("Failed to subscribe to transcripts")?;

        let (frames_tx, mut frames_rx) = mpsc::channel::<AudioFrame>(64);
        let (events_tx, events_rx) = mpsc::channel::<TranscriptEvent>(64);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        // Outbound: frames -> PCM messages; channel close -> final marker
        let publish_client = client.clone();
        let publish_stream_id = stream_id.clone();
        tokio::spawn(async move {
            let subject = format!("audio.frame.{}", publish_stream_id);
            let mut sequence = 0u32;

            while let Some(frame) = frames_rx.recv().await {
                let pcm_bytes: Vec<u8> = frame
                    .samples
                    .iter()
                    .flat_map(|&s| sample_to_i16(s).to_le_bytes())
                    .collect();

                let message = AudioFrameMessage {
                    stream_id: publish_stream_id.clone(),
                    sequence,
                    pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
                    sample_rate: frame.sample_rate,
                    channels: frame.channels,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    final_frame: false,
                };

                match serde_json::to_vec(&message) {
                    Ok(payload) => {
                        if let Err(e) = publish_client.publish(subject.clone(), payload.into()).await
                        {
                            error!("Failed to publish audio frame: {}", e);
                        }
                    }
                    Err(e) => error!("Failed to encode audio frame message: {}", e),
                }

                sequence += 1;
            }

            // End-of-input marker
            let message = AudioFrameMessage {
                stream_id: publish_stream_id.clone(),
                sequence,
                pcm: String::new(),
                sample_rate: format.sample_rate,
                channels: format.channels,
                timestamp: chrono::Utc::now().to_rfc3339(),
                final_frame: true,
            };

            match serde_json::to_vec(&message) {
                Ok(payload) => {
                    if let Err(e) = publish_client.publish(subject, payload.into()).await {
                        error!("Failed to publish final frame marker: {}", e);
                    }
                }
                Err(e) => error!("Failed to encode final frame marker: {}", e),
            }
        });

        // Inbound: transcript messages -> events, until terminal or cancel
        let events_stream_id = stream_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        info!("Recognition stream {} cancelled", events_stream_id);
                        break;
                    }
                    msg = subscriber.next() => {
                        let Some(msg) = msg else {
                            // Connection lost before the terminal event arrived
                            let _ = events_tx
                                .send(TranscriptEvent::Error(RecognitionErrorKind::NetworkLost))
                                .await;
                            break;
                        };

                        let transcript = match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                            Ok(t) => t,
                            Err(e) => {
                                warn!("Failed to parse transcript message: {}", e);
                                continue;
                            }
                        };

                        if transcript.stream_id != events_stream_id {
                            continue;
                        }

                        let event = if let Some(tag) = &transcript.error {
                            TranscriptEvent::Error(RecognitionErrorKind::from_wire(tag))
                        } else if transcript.partial {
                            TranscriptEvent::Partial(transcript.text)
                        } else {
                            TranscriptEvent::Final(transcript.text)
                        };

                        let terminal = event.is_terminal();
                        if events_tx.send(event).await.is_err() {
                            break;
                        }
                        if terminal {
                            break;
                        }
                    }
                }
            }
        });

        info!("Recognition stream {} started", stream_id);

        Ok(RecognitionStream {
            frames: frames_tx,
            events: events_rx,
            cancel: cancel_tx,
        })
    }
}
