use serde::{Deserialize, Serialize};

/// 远端最新版本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersion {
    pub version: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub url: String,
    /// release 说明或提交信息（已截断）
    #[serde(default)]
    pub note: String,
}

/// 更新检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub needs_update: bool,
    pub latest_version: String,
    pub note: String,
}

/// 可更新工具条目（`check` 展示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailable {
    pub name: String,
    pub key: String,
    pub current: String,
    pub latest: String,
    pub note: String,
}

/// 更新结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// 工具此前不可用，转为执行安装
    Installed(super::InstallOutcome),
    UpToDate { latest: String, note: String },
    /// 无法获取远端版本，未执行任何命令
    Unknown { note: String },
    Updated { previous: String, current: String },
}
