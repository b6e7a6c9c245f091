use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 漏洞严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// 宽松解析（大小写不敏感，无法识别的级别归为 Info）
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 从工具输出中提取出的发现
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, id: impl Into<String>) -> Self {
        Self {
            severity,
            id: id.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// 一次工具执行的结果（构造后不可变）
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub tool_key: String,
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// 失败时的说明信息
    pub error: String,
    pub elapsed: Duration,
    pub findings: Vec<Finding>,
}

impl ExecutionResult {
    /// 未执行任何命令即失败
    pub fn rejected(tool_key: &str, command: String, error: impl Into<String>) -> Self {
        Self {
            tool_key: tool_key.to_string(),
            command,
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: error.into(),
            elapsed: Duration::ZERO,
            findings: Vec::new(),
        }
    }
}
