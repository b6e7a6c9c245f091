//! 扫描编排
//!
//! 按策略顺序执行推荐的工具，汇总发现。工具按顺序依次执行，不并发。

use crate::models::{ExecutionResult, Finding, ScanStrategy, Severity};
use crate::services::tool::ToolManager;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// 未安装的推荐工具先尝试安装
    pub install_missing: bool,
}

/// 被跳过的推荐工具
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTool {
    pub tool_key: String,
    pub reason: String,
}

/// 发现按严重级别分组计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub critical_high: usize,
    pub medium: usize,
    pub low_info: usize,
}

impl SeveritySummary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        findings
            .into_iter()
            .fold(Self::default(), |mut summary, finding| {
                match finding.severity {
                    Severity::Critical | Severity::High => summary.critical_high += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::Low | Severity::Info => summary.low_info += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.critical_high + self.medium + self.low_info
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub results: Vec<ExecutionResult>,
    pub skipped: Vec<SkippedTool>,
    pub summary: SeveritySummary,
}

impl ScanReport {
    /// 所有工具的发现（按执行顺序）
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.results.iter().flat_map(|r| r.findings.iter())
    }
}

pub struct ScanRunner<'a> {
    manager: &'a ToolManager,
}

impl<'a> ScanRunner<'a> {
    pub fn new(manager: &'a ToolManager) -> Self {
        Self { manager }
    }

    pub async fn run(&self, target: &str, strategy: &ScanStrategy, options: ScanOptions) -> ScanReport {
        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for step in strategy.ordered_tools() {
            let key = step.tool_key.as_str();
            let state = match self.manager.state(key).await {
                Ok(state) => state,
                Err(_) => {
                    tracing::warn!(tool = %key, "策略推荐了未知工具，跳过");
                    skipped.push(SkippedTool {
                        tool_key: key.to_string(),
                        reason: format!("Unknown tool: {key}"),
                    });
                    continue;
                }
            };

            if !state.installed {
                if !options.install_missing {
                    skipped.push(SkippedTool {
                        tool_key: key.to_string(),
                        reason: "not installed".to_string(),
                    });
                    continue;
                }
                if let Err(e) = self.manager.install(key).await {
                    tracing::warn!(tool = %key, error = %e, "扫描前安装失败，跳过");
                    skipped.push(SkippedTool {
                        tool_key: key.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }

            results.push(self.manager.execute(key, target, None).await);
        }

        let summary = SeveritySummary::from_findings(results.iter().flat_map(|r| r.findings.iter()));
        tracing::info!(
            target = %target,
            executed = results.len(),
            skipped = skipped.len(),
            findings = summary.total(),
            "扫描完成"
        );

        ScanReport {
            target: target.to_string(),
            results,
            skipped,
            summary,
        }
    }
}
