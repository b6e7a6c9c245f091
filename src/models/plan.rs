use serde::{Deserialize, Serialize};

/// 推荐执行的工具
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedTool {
    #[serde(default)]
    pub order: u32,
    #[serde(rename = "tool", alias = "tool_key")]
    pub tool_key: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub command: String,
}

/// 扫描策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStrategy {
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub thoughts: String,
    #[serde(default)]
    pub recommended_tools: Vec<RecommendedTool>,
    #[serde(default)]
    pub scan_strategy: String,
    #[serde(default)]
    pub estimated_time: String,
}

impl ScanStrategy {
    /// 按 order 排序后的工具列表
    pub fn ordered_tools(&self) -> Vec<&RecommendedTool> {
        let mut tools: Vec<&RecommendedTool> = self.recommended_tools.iter().collect();
        tools.sort_by_key(|t| t.order);
        tools
    }
}
