pub mod base;
pub mod gemini;

pub use base::ProviderConfig;
pub use gemini::GeminiProviderConfig;
