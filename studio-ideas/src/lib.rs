//! Idea-generation tool server.
//!
//! Tools: `generate_video_ideas`, `get_trending_topics` and `analyze_virality`.

#![warn(missing_docs, clippy::pedantic)]

pub mod ideas;
pub mod trending;
pub mod virality;

use studio_kernel::{ServerInfo, StudioContext, bind};
use studio_tools::{ToolRegistry, ToolResult};

/// Identity reported to clients.
pub const SERVER_INFO: ServerInfo = ServerInfo {
    name: "studio-ideas",
    version: env!("CARGO_PKG_VERSION"),
};

/// Builds the registry in discovery order.
///
/// # Errors
///
/// Returns a registration error if a descriptor is malformed or duplicated.
pub fn registry(studio: &StudioContext) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register_tool(ideas::descriptor()?, bind(studio, ideas::run))?;
    registry.register_tool(trending::descriptor()?, bind(studio, trending::run))?;
    registry.register_tool(virality::descriptor()?, bind(studio, virality::run))?;
    Ok(registry)
}
