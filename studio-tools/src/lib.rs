//! Tool contract layer shared by the creator tool servers.
//!
//! A server declares each tool once as a [`ToolDescriptor`] (name, description
//! and [`ArgumentSchema`]) and registers an implementation in a
//! [`ToolRegistry`]. The [`Dispatcher`] then owns the call lifecycle: trace id,
//! lookup, validation, invocation and the [`ResponseEnvelope`]. Handlers use
//! [`ExtractionPolicy`] and [`retain_valid`] to turn free-form provider text
//! into trusted JSON.

#![warn(missing_docs, clippy::pedantic)]

pub mod call;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod filter;
pub mod registry;
pub mod schema;

pub use call::CallContext;
pub use dispatch::Dispatcher;
pub use envelope::{ContentItem, ResponseEnvelope};
pub use error::{ToolError, ToolResult, Violation};
pub use extract::{ExtractionPolicy, JsonShape, extract_json};
pub use filter::{ElementCheck, retain_valid};
pub use registry::{Tool, ToolDescriptor, ToolHandle, ToolRegistry};
pub use schema::{ArgumentSchema, FieldKind, FieldSpec, from_args};
