pub mod agent;
pub mod asr;
pub mod config;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod request_context;
pub mod routes;
pub mod state;
pub mod tts;
