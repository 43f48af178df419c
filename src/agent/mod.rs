pub mod gemini;
pub mod interface;
pub mod responder;

pub use gemini::GeminiClient;
pub use interface::ChatCompletion;
pub use responder::ResponseGenerator;
