pub mod base;
pub mod configs;
pub mod gemini;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod mock;
