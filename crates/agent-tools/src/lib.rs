//! Tool registration surface for agent hosts.
//!
//! A host runtime discovers tools through [`ToolRegistry::specs`] and invokes
//! them by name with JSON arguments. The value analysis is exposed as the
//! `buffett_analysis` tool.

pub mod buffett;
pub mod error;
pub mod registry;
pub mod traits;

pub use buffett::{register_buffett_analysis, BUFFETT_TOOL_DESCRIPTION, BUFFETT_TOOL_NAME};
pub use error::ToolError;
pub use registry::{ticker_arg, FnTool, ToolRegistry};
pub use traits::{Tool, ToolResult, ToolSpec};
