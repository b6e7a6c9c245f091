//! 统一错误类型定义
//!
//! 所有生命周期操作的失败都以 `AppError` 表示，配置类错误（未知工具、非法模板）
//! 必须在任何副作用发生之前返回。

use crate::data::DataError;
use std::path::PathBuf;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 目录中不存在该工具
    #[error("未知工具: {key}（可用工具: {}）", available.join(", "))]
    UnknownTool { key: String, available: Vec<String> },

    /// 命令模板无法解析（占位符错误等）
    #[error("命令模板无效: {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// 其他配置错误
    #[error("配置错误: {reason}")]
    Config { reason: String },

    /// 缺少前置命令（git、go 等）
    #[error("{tool} 缺少前置依赖 {prerequisite}，请先安装: {hint}")]
    MissingPrerequisite {
        tool: String,
        prerequisite: String,
        hint: String,
    },

    /// 安装命令失败（非零退出或超时）
    #[error("{tool} 安装失败: {stderr}")]
    InstallFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    /// 安装命令退出码为 0，但探测不到可用的产物
    #[error("{tool} 安装命令已完成，但未检测到可用安装: {}", path.display())]
    NotAvailableAfterInstall { tool: String, path: PathBuf },

    /// 更新命令失败
    #[error("{tool} 更新失败: {stderr}")]
    UpdateFailed { tool: String, stderr: String },

    /// 清理残留安装目录失败
    #[error("清理残留安装目录失败: {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 文件 I/O 错误
    #[error("文件 I/O 错误: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 数据层错误（状态文件读写）
    #[error(transparent)]
    Data(#[from] DataError),

    /// 策略顾问错误（仅在内部用于触发规则回退）
    #[error("策略分析失败: {reason}")]
    Strategy { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 是否为配置类错误（不可重试，不产生副作用）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::UnknownTool { .. } | AppError::InvalidTemplate { .. } | AppError::Config { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
