use analysis_core::AnalysisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    Duplicate(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool '{tool}' failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: AnalysisError,
    },
}
