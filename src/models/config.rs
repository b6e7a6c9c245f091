// 全局配置结构，放在 models 以便在库和二进制之间共享
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// 解析字符串为日志级别
    pub fn parse(level_str: &str) -> Result<LogLevel, String> {
        match level_str.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("无效的日志级别: {level_str}")),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

/// 日志配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub output: LogOutput,
    /// 日志目录（为空时使用 ~/.arsenal/logs）
    #[serde(default)]
    pub file_path: Option<String>,
}

/// 各类子进程 / 网络请求的超时（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_install_secs")]
    pub install_secs: u64,
    #[serde(default = "default_command_secs")]
    pub command_secs: u64,
    #[serde(default = "default_execution_secs")]
    pub execution_secs: u64,
    #[serde(default = "default_oracle_secs")]
    pub oracle_secs: u64,
    #[serde(default = "default_strategy_secs")]
    pub strategy_secs: u64,
}

fn default_install_secs() -> u64 {
    600
}

fn default_command_secs() -> u64 {
    300
}

fn default_execution_secs() -> u64 {
    600
}

fn default_oracle_secs() -> u64 {
    15
}

fn default_strategy_secs() -> u64 {
    60
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            install_secs: default_install_secs(),
            command_secs: default_command_secs(),
            execution_secs: default_execution_secs(),
            oracle_secs: default_oracle_secs(),
            strategy_secs: default_strategy_secs(),
        }
    }
}

impl Timeouts {
    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    /// 更新 / 版本查询命令
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    pub fn execution(&self) -> Duration {
        Duration::from_secs(self.execution_secs)
    }

    pub fn oracle(&self) -> Duration {
        Duration::from_secs(self.oracle_secs)
    }

    /// LLM 策略请求
    pub fn strategy(&self) -> Duration {
        Duration::from_secs(self.strategy_secs)
    }
}

/// 应用配置（~/.arsenal/config.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,
    /// 状态文件路径（为空时为 `<tools_dir>/tool_state.json`）
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default = "default_python_command")]
    pub python_command: String,
    /// 自定义工具目录（JSON），替换内置工具表
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default = "default_anthropic_api_base")]
    pub anthropic_api_base: String,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub log: LogConfig,
}

pub fn default_tools_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".arsenal")
        .join("tools")
}

pub fn default_python_command() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

fn default_github_api_base() -> String {
    DEFAULT_GITHUB_API_BASE.to_string()
}

fn default_anthropic_api_base() -> String {
    DEFAULT_ANTHROPIC_API_BASE.to_string()
}

fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tools_dir: default_tools_dir(),
            state_file: None,
            python_command: default_python_command(),
            catalog_path: None,
            github_api_base: default_github_api_base(),
            github_token: None,
            anthropic_api_base: default_anthropic_api_base(),
            anthropic_api_key: None,
            anthropic_model: default_anthropic_model(),
            timeouts: Timeouts::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 实际使用的状态文件路径
    pub fn state_file_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.tools_dir.join("tool_state.json"))
    }
}
