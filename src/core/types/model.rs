//! The closed model set and its fallback chain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical model name; determines the queue a task is dispatched to.
///
/// The set is closed: queue keys, key pools, and the fallback chain are
/// all indexed by these five names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    /// Anthropic Claude 3 Opus
    #[serde(rename = "claude-3-opus")]
    ClaudeOpus,
    /// OpenAI GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    /// DeepSeek Coder
    #[serde(rename = "deepseek-coder")]
    DeepseekCoder,
    /// Cohere Command R+
    #[serde(rename = "command-r-plus")]
    CommandRPlus,
    /// Google Gemini Pro
    #[serde(rename = "gemini-pro")]
    GeminiPro,
}

impl ModelId {
    /// All members of the closed set, in dispatch-plane order
    pub const ALL: [ModelId; 5] = [
        ModelId::ClaudeOpus,
        ModelId::Gpt4o,
        ModelId::DeepseekCoder,
        ModelId::CommandRPlus,
        ModelId::GeminiPro,
    ];

    /// Canonical queue-key form of the model name
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::ClaudeOpus => "claude-3-opus",
            ModelId::Gpt4o => "gpt-4o",
            ModelId::DeepseekCoder => "deepseek-coder",
            ModelId::CommandRPlus => "command-r-plus",
            ModelId::GeminiPro => "gemini-pro",
        }
    }

    /// Next candidate along the static fallback chain.
    ///
    /// Used by parse-kind retries and the orchestrator's rebalance step:
    /// claude-3-opus ↔ gpt-4o, deepseek-coder → gpt-4o,
    /// command-r-plus ↔ gemini-pro.
    pub fn fallback(&self) -> Option<ModelId> {
        match self {
            ModelId::ClaudeOpus => Some(ModelId::Gpt4o),
            ModelId::Gpt4o => Some(ModelId::ClaudeOpus),
            ModelId::DeepseekCoder => Some(ModelId::Gpt4o),
            ModelId::CommandRPlus => Some(ModelId::GeminiPro),
            ModelId::GeminiPro => Some(ModelId::CommandRPlus),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude-3-opus" => Ok(ModelId::ClaudeOpus),
            "gpt-4o" => Ok(ModelId::Gpt4o),
            "deepseek-coder" => Ok(ModelId::DeepseekCoder),
            "command-r-plus" => Ok(ModelId::CommandRPlus),
            "gemini-pro" => Ok(ModelId::GeminiPro),
            other => Err(format!("unknown model: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for model in ModelId::ALL {
            assert_eq!(model.as_str().parse::<ModelId>().unwrap(), model);
        }
    }

    #[test]
    fn test_serde_uses_queue_key_form() {
        let json = serde_json::to_string(&ModelId::ClaudeOpus).unwrap();
        assert_eq!(json, "\"claude-3-opus\"");
        let back: ModelId = serde_json::from_str("\"deepseek-coder\"").unwrap();
        assert_eq!(back, ModelId::DeepseekCoder);
    }

    #[test]
    fn test_fallback_chain() {
        assert_eq!(ModelId::ClaudeOpus.fallback(), Some(ModelId::Gpt4o));
        assert_eq!(ModelId::Gpt4o.fallback(), Some(ModelId::ClaudeOpus));
        assert_eq!(ModelId::DeepseekCoder.fallback(), Some(ModelId::Gpt4o));
        assert_eq!(ModelId::CommandRPlus.fallback(), Some(ModelId::GeminiPro));
        assert_eq!(ModelId::GeminiPro.fallback(), Some(ModelId::CommandRPlus));
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!("gpt-5".parse::<ModelId>().is_err());
    }
}
