//! 规则策略（不依赖任何外部服务）

use super::{StrategyAdvisor, StrategyRequest};
use crate::models::{RecommendedTool, ScanStrategy};
use async_trait::async_trait;

/// 固定规则：路径发现 → SQL 注入（目标带查询串或 login 时）→ XSS
#[derive(Debug, Clone)]
pub struct RuleBasedAdvisor {
    python: String,
}

impl RuleBasedAdvisor {
    pub fn new(python: &str) -> Self {
        Self {
            python: python.to_string(),
        }
    }

    /// 生成策略（纯函数）
    pub fn plan(&self, target: &str) -> ScanStrategy {
        let mut steps = vec![(
            "dirsearch",
            "Hidden path detection",
            format!("{} dirsearch.py -u {target}", self.python),
        )];

        if looks_injectable(target) {
            steps.push((
                "sqlmap",
                "SQL Injection testing",
                format!("{} sqlmap.py -u {target} --batch", self.python),
            ));
        }

        steps.push((
            "xsstrike",
            "XSS vulnerability testing",
            format!("{} xsstrike.py -u {target}", self.python),
        ));

        let recommended_tools = steps
            .into_iter()
            .enumerate()
            .map(|(i, (tool, reason, command))| RecommendedTool {
                order: i as u32 + 1,
                tool_key: tool.to_string(),
                reason: reason.to_string(),
                command,
            })
            .collect();

        ScanStrategy {
            observation: format!("Target URL: {target}"),
            thoughts: "Rule-based analysis (No AI)".to_string(),
            recommended_tools,
            scan_strategy: "Path discovery -> SQLi -> XSS".to_string(),
            estimated_time: "About 10-30 minutes".to_string(),
        }
    }
}

impl Default for RuleBasedAdvisor {
    fn default() -> Self {
        Self::new(crate::models::default_python_command().as_str())
    }
}

fn looks_injectable(target: &str) -> bool {
    target.contains('?') || target.to_lowercase().contains("login")
}

#[async_trait]
impl StrategyAdvisor for RuleBasedAdvisor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn analyze(&self, request: &StrategyRequest) -> ScanStrategy {
        self.plan(&request.target)
    }
}
