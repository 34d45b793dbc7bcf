//! Provider adapters used by the creator tool servers.
//!
//! Text generation goes through [`traits::ModelAdapter`], speech through
//! [`speech::SpeechSynthesizer`] and topic discovery through
//! [`trends::TrendSource`]. Every network call runs under a caller-supplied
//! deadline.

#![warn(missing_docs, clippy::pedantic)]

pub mod elevenlabs;
pub mod gemini;
pub mod openai;
pub mod speech;
pub mod traits;
pub mod trends;

mod http_client;
