//! Model, region and prompt resolution for media analysis.
//!
//! Precedence: explicit argument, then the loaded config (which already
//! carries environment values), then caller defaults, then hardcoded values.

use cairn_rs_config::{
    DEFAULT_MEDIA_MODEL, DEFAULT_MEDIA_SYSTEM_PROMPT, DEFAULT_REGION, MediaConfig,
    resolve_with_fallback,
};

/// Defaults supplied by whatever hosts the tool, e.g. the agent's own model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerDefaults {
    pub model_id: Option<String>,
    pub region: Option<String>,
    pub system_prompt: Option<String>,
}

/// Explicit per-call arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOverrides {
    pub model_id: Option<String>,
    pub region: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub model_id: String,
    pub region: String,
    pub system_prompt: String,
    pub max_inline_bytes: u64,
}

impl AnalysisSettings {
    pub fn resolve(
        overrides: &AnalysisOverrides,
        config: &MediaConfig,
        caller: &CallerDefaults,
    ) -> Self {
        Self {
            model_id: resolve_with_fallback(
                [
                    overrides.model_id.as_deref(),
                    config.model_id.as_deref(),
                    caller.model_id.as_deref(),
                ],
                DEFAULT_MEDIA_MODEL,
            ),
            region: resolve_with_fallback(
                [
                    overrides.region.as_deref(),
                    config.region.as_deref(),
                    caller.region.as_deref(),
                ],
                DEFAULT_REGION,
            ),
            system_prompt: resolve_with_fallback(
                [
                    overrides.system_prompt.as_deref(),
                    config.system_prompt.as_deref(),
                    caller.system_prompt.as_deref(),
                ],
                DEFAULT_MEDIA_SYSTEM_PROMPT,
            ),
            max_inline_bytes: config.max_inline_bytes,
        }
    }
}
