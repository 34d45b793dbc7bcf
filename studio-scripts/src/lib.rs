//! Script-production tool server.
//!
//! Tools: `generate_script`, `generate_storyboard`, `generate_voiceover` and
//! `export_project`. Script and storyboard replies are extracted strictly; a
//! reply without usable JSON fails the call.

#![warn(missing_docs, clippy::pedantic)]

pub mod export;
pub mod script;
pub mod storyboard;
pub mod voiceover;

use studio_kernel::{ServerInfo, StudioContext, bind};
use studio_tools::{ToolRegistry, ToolResult};

/// Identity reported to clients.
pub const SERVER_INFO: ServerInfo = ServerInfo {
    name: "studio-scripts",
    version: env!("CARGO_PKG_VERSION"),
};

/// Builds the registry in discovery order.
///
/// # Errors
///
/// Returns a registration error if a descriptor is malformed or duplicated.
pub fn registry(studio: &StudioContext) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register_tool(script::descriptor()?, bind(studio, script::run))?;
    registry.register_tool(storyboard::descriptor()?, bind(studio, storyboard::run))?;
    registry.register_tool(voiceover::descriptor()?, bind(studio, voiceover::run))?;
    registry.register_tool(export::descriptor()?, bind(studio, export::run))?;
    Ok(registry)
}
