pub mod sink;

pub use sink::{
    sample_to_i16, AudioSink, RecordingProvider, RecordingSink, WavRecordingProvider,
};
