//! Tool entry points
//!
//! JSON-in, text-out wrappers around [`Introspector`] for tool-calling hosts.
//! Errors never escape: they are reported as a [`ToolOutput`] with
//! `is_error` set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::analysis::Introspector;
use crate::context::RequestContext;
use crate::error::AnalysisResult;

pub const ANALYZE_ENTITY: &str = "analyze_entity";
pub const GET_ENTITY_DEPENDENCIES: &str = "get_entity_dependencies";

/// Text result of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeEntityArgs {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub include_history: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntityDependenciesArgs {
    #[serde(default)]
    pub entity_id: Option<String>,
}

/// Parse tool arguments; `null` counts as no arguments
fn parse_args<T>(args: Value) -> Result<T, ToolOutput>
where
    T: serde::de::DeserializeOwned + Default,
{
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args).map_err(|err| ToolOutput::error(format!("invalid arguments: {err}")))
}

/// Pretty-print a result, or report its error
fn render<T: Serialize>(tool: &'static str, result: AnalysisResult<T>) -> ToolOutput {
    let rendered = result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?));
    match rendered {
        Ok(text) => ToolOutput::success(text),
        Err(err) => {
            if !err.is_validation() {
                warn!(tool, error = %err, "Tool call failed");
            }
            ToolOutput::error(err.to_string())
        }
    }
}

/// `analyze_entity` tool
pub async fn analyze_entity(introspector: &Introspector, ctx: &RequestContext, args: Value) -> ToolOutput {
    let args: AnalyzeEntityArgs = match parse_args(args) {
        Ok(args) => args,
        Err(output) => return output,
    };

    let entity_id = args.entity_id.unwrap_or_default();
    let include_history = args.include_history.unwrap_or(false);
    render(
        ANALYZE_ENTITY,
        introspector
            .analyze_entity(ctx, &entity_id, include_history)
            .await,
    )
}

/// `get_entity_dependencies` tool
pub async fn get_entity_dependencies(
    introspector: &Introspector,
    ctx: &RequestContext,
    args: Value,
) -> ToolOutput {
    let args: EntityDependenciesArgs = match parse_args(args) {
        Ok(args) => args,
        Err(output) => return output,
    };

    let entity_id = args.entity_id.unwrap_or_default();
    render(
        GET_ENTITY_DEPENDENCIES,
        introspector.entity_dependencies(ctx, &entity_id).await,
    )
}
