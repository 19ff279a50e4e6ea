pub mod events;
pub mod nats;
pub mod provider;
pub mod sink;

pub use events::{TranscriptEvent, TranscriptionState};
pub use nats::{AudioFrameMessage, NatsTranscriptionProvider, TranscriptMessage};
pub use provider::{RecognitionStream, TranscriptionProvider};
pub use sink::TranscriptionSink;
