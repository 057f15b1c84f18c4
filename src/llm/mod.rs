//! Generative-AI analysis: prompt, endpoint client, response parsing

pub mod analyzer;
pub mod client;
pub mod prompts;
