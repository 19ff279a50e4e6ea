use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::audio::{AudioFormat, AudioFrame};

use super::events::TranscriptEvent;

/// One in-flight streaming recognition exchange.
///
/// Audio goes in on `frames`; partial/terminal results come back on `events`.
/// Dropping `frames` signals end-of-input. `cancel` is a fire-and-forget
/// abort request; the provider is free to ignore it once the exchange has
/// finalized.
pub struct RecognitionStream {
    pub frames: mpsc::Sender<AudioFrame>,
    pub events: mpsc::Receiver<TranscriptEvent>,
    pub cancel: oneshot::Sender<()>,
}

/// Streaming speech-to-text collaborator
///
/// Implementations wrap whatever transport the recognizer lives behind; the
/// session only sees channels.
#[async_trait::async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Begin a new recognition exchange for audio in the given format.
    async fn begin(&self, format: AudioFormat) -> Result<RecognitionStream>;
}
