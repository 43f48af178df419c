pub mod client;
pub mod interface;

pub use client::SpeechServiceSynthesizer;
pub use interface::SpeechSynthesizer;
