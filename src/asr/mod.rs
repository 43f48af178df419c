pub mod client;
pub mod interface;

pub use client::SpeechServiceTranscriber;
pub use interface::Transcriber;
