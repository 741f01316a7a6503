//! Speech seams: transcription (`/listen`) and synthesis (`/talk`).

pub mod deepgram;

pub use deepgram::DeepgramSpeech;

use std::future::Future;
use std::pin::Pin;

/// Speech-to-text seam.
pub trait Transcriber: Send + Sync {
    /// Vendor identifier (e.g. "deepgram").
    fn name(&self) -> &str;

    /// Transcribe one recording. `content_type` is advisory; browsers lie
    /// about recording formats, so vendors sniff the bytes anyway.
    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        content_type: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// Text-to-speech seam.
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesize `text` with the given vendor voice, returning MP3 bytes.
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>>;
}
