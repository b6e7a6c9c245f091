//! LLM 策略顾问（Anthropic Messages API）

use super::rules::RuleBasedAdvisor;
use super::{StrategyAdvisor, StrategyRequest};
use crate::core::error::{AppError, AppResult};
use crate::core::http::build_http_client;
use crate::models::ScanStrategy;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

const RESPONSE_FORMAT: &str = r#"Respond ONLY in the following JSON format:
{
    "observation": "Observation about the target",
    "thoughts": "Your analysis thoughts",
    "recommended_tools": [
        {
            "order": 1,
            "tool": "tool key",
            "reason": "Selection reason",
            "command": "Execution command"
        }
    ],
    "scan_strategy": "Overall strategy",
    "estimated_time": "Estimated time"
}"#;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// 构建策略分析提示词
pub fn build_prompt(request: &StrategyRequest) -> String {
    let mut tools_info = String::from("Available security tools:\n\n");
    for tool in &request.tools {
        let status = if tool.installed {
            "[OK] Installed"
        } else {
            "[X] Not installed"
        };
        let _ = writeln!(tools_info, "- {} ({}): {}", tool.name, tool.key, tool.description);
        let _ = writeln!(tools_info, "  Type: {} | Status: {}\n", tool.category, status);
    }

    format!(
        "You are a senior security engineer.\n\
         Create a vulnerability scanning strategy for the target.\n\n\
         ## Target: {}\n\
         ## Additional Info: {}\n\n\
         ## {}\n\
         {}",
        request.target,
        request.context.as_deref().unwrap_or("None"),
        tools_info,
        RESPONSE_FORMAT
    )
}

/// 从回复文本中提取策略 JSON（第一个 `{` 到最后一个 `}`）
pub fn parse_strategy_response(text: &str) -> AppResult<ScanStrategy> {
    let span = text
        .find('{')
        .zip(text.rfind('}'))
        .filter(|(start, end)| start < end)
        .map(|(start, end)| &text[start..=end])
        .ok_or_else(|| AppError::Strategy {
            reason: "回复中没有 JSON 对象".to_string(),
        })?;

    serde_json::from_str(span).map_err(|e| AppError::Strategy {
        reason: format!("策略 JSON 解析失败: {e}"),
    })
}

/// 调用 LLM 生成策略，失败时回退到规则策略
pub struct LlmAdvisor {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    fallback: RuleBasedAdvisor,
}

impl LlmAdvisor {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
        fallback: RuleBasedAdvisor,
    ) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            fallback,
        })
    }

    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let endpoint = format!("{}/v1/messages", self.api_base);
        let response = self
            .client
            .post(&endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                messages: vec![Message {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|e| AppError::Strategy {
                reason: format!("请求失败: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            return Err(AppError::Strategy {
                reason: format!("http {status}: {}", crate::utils::truncate_chars(&body, 200)),
            });
        }

        let payload: MessagesResponse = response.json().await.map_err(|e| AppError::Strategy {
            reason: format!("响应格式无效: {e}"),
        })?;

        let text: String = payload
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect();
        Ok(text)
    }

    async fn try_analyze(&self, request: &StrategyRequest) -> AppResult<ScanStrategy> {
        let text = self.complete(&build_prompt(request)).await?;
        parse_strategy_response(&text)
    }
}

#[async_trait]
impl StrategyAdvisor for LlmAdvisor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn analyze(&self, request: &StrategyRequest) -> ScanStrategy {
        match self.try_analyze(request).await {
            Ok(strategy) => {
                tracing::info!(
                    tools = strategy.recommended_tools.len(),
                    "LLM 策略分析完成"
                );
                strategy
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM 策略分析失败，回退到规则策略");
                self.fallback.plan(&request.target)
            }
        }
    }
}
