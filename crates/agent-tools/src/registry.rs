use analysis_core::AnalysisError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Tool, ToolError, ToolResult, ToolSpec};

type HandlerFuture = Pin<Box<dyn Future<Output = Result<String, AnalysisError>> + Send>>;
type TickerHandler = Arc<dyn Fn(String) -> HandlerFuture + Send + Sync>;

/// Extract the `ticker` argument. Accepts `{"ticker": "AAPL"}` or a bare `"AAPL"`.
pub fn ticker_arg(args: &Value) -> Result<String, ToolError> {
    let raw = match args {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("ticker").and_then(|v| v.as_str()),
        _ => None,
    };
    match raw.map(str::trim) {
        Some(ticker) if !ticker.is_empty() => Ok(ticker.to_string()),
        _ => Err(ToolError::InvalidArguments(
            "expected a non-empty string argument 'ticker'".to_string(),
        )),
    }
}

/// A tool backed by an async `(ticker) -> text` handler.
pub struct FnTool {
    name: String,
    description: String,
    handler: TickerHandler,
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. AAPL"
                }
            },
            "required": ["ticker"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let ticker = ticker_arg(&args)?;
        let output = (self.handler)(ticker)
            .await
            .map_err(|source| ToolError::Execution {
                tool: self.name.clone(),
                source,
            })?;
        Ok(ToolResult::success(output))
    }
}

/// Tools exposed to the host runtime, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::Duplicate(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "Registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Register an async `(ticker) -> text` handler under `name`.
    pub fn register_fn<F, Fut>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, AnalysisError>> + Send + 'static,
    {
        let handler: TickerHandler =
            Arc::new(move |ticker: String| -> HandlerFuture { Box::pin(handler(ticker)) });
        self.register(Arc::new(FnTool {
            name: name.to_string(),
            description: description.to_string(),
            handler,
        }))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn invoke(&self, name: &str, args: Value) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(args).await
    }

    /// Like [`invoke`](Self::invoke), but reports failures as a failed
    /// [`ToolResult`] for hosts that expect a result envelope.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolResult {
        match self.invoke(name, args).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tool = name, error = %e, "Tool invocation failed");
                ToolResult::failure(e.to_string())
            }
        }
    }
}
