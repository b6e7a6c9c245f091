//! 扫描策略选择
//!
//! 两种实现：
//! - `LlmAdvisor`: 调用 Anthropic Messages API 生成策略，任何失败都回退到规则
//! - `RuleBasedAdvisor`: 固定规则，总能给出可用的策略

mod llm;
mod rules;

pub use llm::{build_prompt, parse_strategy_response, LlmAdvisor};
pub use rules::RuleBasedAdvisor;

use crate::core::error::AppResult;
use crate::models::{AppConfig, ScanStrategy, ToolStatus};
use async_trait::async_trait;

/// 一次策略分析的输入
#[derive(Debug, Clone)]
pub struct StrategyRequest {
    pub target: String,
    /// 用户补充的上下文信息
    pub context: Option<String>,
    /// 工具目录及当前安装状态
    pub tools: Vec<ToolStatus>,
}

impl StrategyRequest {
    pub fn new(target: impl Into<String>, tools: Vec<ToolStatus>) -> Self {
        Self {
            target: target.into(),
            context: None,
            tools,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context.filter(|c| !c.trim().is_empty());
        self
    }
}

/// 策略顾问
///
/// `analyze` 必须总是返回可用的策略，失败时由实现自行回退。
#[async_trait]
pub trait StrategyAdvisor: Send + Sync {
    /// 展示名
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: &StrategyRequest) -> ScanStrategy;
}

/// 按配置选择策略顾问：配置了 API Key 时使用 LLM，否则使用规则
pub fn advisor_from_config(config: &AppConfig) -> AppResult<Box<dyn StrategyAdvisor>> {
    let rules = RuleBasedAdvisor::new(&config.python_command);
    match config.anthropic_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!(model = %config.anthropic_model, "使用 LLM 策略顾问");
            Ok(Box::new(LlmAdvisor::new(
                &config.anthropic_api_base,
                key,
                &config.anthropic_model,
                config.timeouts.strategy(),
                rules,
            )?))
        }
        None => {
            tracing::info!("未配置 API Key，使用规则策略");
            Ok(Box::new(rules))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_selection() {
        let mut config = AppConfig::default();
        config.anthropic_api_key = None;
        assert_eq!(advisor_from_config(&config).unwrap().name(), "rules");

        config.anthropic_api_key = Some(String::new());
        assert_eq!(advisor_from_config(&config).unwrap().name(), "rules");

        config.anthropic_api_key = Some("sk-test".to_string());
        assert_eq!(advisor_from_config(&config).unwrap().name(), "llm");
    }

    #[test]
    fn test_blank_context_dropped() {
        let request = StrategyRequest::new("http://t", vec![]).with_context(Some("  ".to_string()));
        assert!(request.context.is_none());
    }
}
