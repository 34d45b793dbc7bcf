//! Prompt construction data for the tool servers.
//!
//! Handlers render a [`PromptTemplate`] from [`library`] with their validated
//! arguments and platform details from [`platforms`].

#![warn(missing_docs, clippy::pedantic)]

pub mod library;
pub mod platforms;
pub mod template;

pub use platforms::{PlatformProfile, profile};
pub use template::{PromptTemplate, PromptVars, TemplateError, TemplateResult};
