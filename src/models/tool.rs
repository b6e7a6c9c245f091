use super::template::{CommandKind, CommandTemplate};
use crate::core::error::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 工具类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    Scanner,
    InjectionTester,
    XssDetector,
    NetworkScan,
    Fuzzer,
    Recon,
}

impl ToolCategory {
    /// 展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            ToolCategory::Scanner => "Vuln Scanner",
            ToolCategory::InjectionTester => "SQL Injection",
            ToolCategory::XssDetector => "XSS Detection",
            ToolCategory::NetworkScan => "Network Scan",
            ToolCategory::Fuzzer => "Fuzzer",
            ToolCategory::Recon => "Recon",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 安装方式（决定可用性探测规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallMethod {
    /// git clone 到安装目录
    GitClone,
    /// 包管理器 / go install，产物在 PATH 上
    Package,
    /// 其他方式生成的目录
    Directory,
}

/// 单个平台的一组命令模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCommands {
    pub install: CommandTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<CommandTemplate>,
    pub update: CommandTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<CommandTemplate>,
}

impl PlatformCommands {
    pub fn get(&self, kind: CommandKind) -> Option<&CommandTemplate> {
        match kind {
            CommandKind::Install => Some(&self.install),
            CommandKind::Run => self.run.as_ref(),
            CommandKind::Update => Some(&self.update),
            CommandKind::Version => self.version.as_ref(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        for kind in [
            CommandKind::Install,
            CommandKind::Run,
            CommandKind::Update,
            CommandKind::Version,
        ] {
            if let Some(template) = self.get(kind) {
                template.check_kind(kind)?;
            }
        }
        Ok(())
    }
}

/// POSIX / Windows 两套命令模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplates {
    pub posix: PlatformCommands,
    pub windows: PlatformCommands,
}

impl CommandTemplates {
    /// 当前平台的模板
    pub fn current(&self) -> &PlatformCommands {
        if cfg!(windows) {
            &self.windows
        } else {
            &self.posix
        }
    }
}

/// 工具定义（来自目录，运行期不可变）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub key: String,
    pub name: String,
    /// 上游仓库 `owner/name`
    pub repo: String,
    pub category: ToolCategory,
    pub description: String,
    pub templates: CommandTemplates,
    pub install_path: PathBuf,
    pub install_method: InstallMethod,
    /// 安装目录内必须存在的文件（相对路径）
    #[serde(default)]
    pub required_files: Vec<String>,
    /// 在 PATH 上查找的命令名
    #[serde(default)]
    pub command_aliases: Vec<String>,
    /// 是否需要编译工具链（如 Go）
    #[serde(default)]
    pub requires_runtime: bool,
}

impl ToolDescriptor {
    /// 校验模板占位符与命令种类是否匹配
    pub fn validate(&self) -> AppResult<()> {
        self.templates.posix.validate()?;
        self.templates.windows.validate()
    }

    /// 当前平台的指定命令
    pub fn command(&self, kind: CommandKind) -> Option<&CommandTemplate> {
        self.templates.current().get(kind)
    }

    /// PATH 探测候选命令名
    pub fn candidate_commands(&self) -> Vec<String> {
        if !self.command_aliases.is_empty() {
            return self.command_aliases.clone();
        }
        let mut candidates = vec![self.key.clone()];
        let compact: String = self
            .name
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !candidates.contains(&compact) {
            candidates.push(compact);
        }
        candidates
    }

    pub fn is_git_clone(&self) -> bool {
        self.install_method == InstallMethod::GitClone
    }

    pub fn requirement_note(&self) -> Option<&'static str> {
        self.requires_runtime.then_some("Go required")
    }
}

/// 工具运行时状态（持久化到状态文件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolState {
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub local_version: String,
    /// 仅在内存中保存，不写入状态文件
    #[serde(skip)]
    pub latest_version: String,
    #[serde(default)]
    pub last_updated: String,
}

impl ToolState {
    /// 标记为未安装（同时清空版本和更新时间）
    pub fn mark_missing(&mut self) {
        self.installed = false;
        self.local_version.clear();
        self.last_updated.clear();
    }

    pub fn mark_installed(&mut self, version: String, timestamp: String) {
        self.installed = true;
        self.local_version = version;
        self.last_updated = timestamp;
    }
}

/// 工具状态（`list` 展示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    pub key: String,
    pub name: String,
    pub category: String,
    pub installed: bool,
    pub version: String,
    pub last_updated: String,
    pub description: String,
    pub requirement: Option<String>,
}

impl ToolStatus {
    pub fn from_parts(tool: &ToolDescriptor, state: &ToolState) -> Self {
        let or_default = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        ToolStatus {
            key: tool.key.clone(),
            name: tool.name.clone(),
            category: tool.category.label().to_string(),
            installed: state.installed,
            version: or_default(&state.local_version, "N/A"),
            last_updated: or_default(&state.last_updated, "Never"),
            description: tool.description.clone(),
            requirement: tool.requirement_note().map(str::to_string),
        }
    }
}

/// 安装结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// 已可用，未执行安装命令
    AlreadyInstalled { version: String },
    Installed { version: String },
}

impl InstallOutcome {
    pub fn version(&self) -> &str {
        match self {
            InstallOutcome::AlreadyInstalled { version } | InstallOutcome::Installed { version } => {
                version
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(aliases: Vec<&str>) -> ToolDescriptor {
        let commands = PlatformCommands {
            install: CommandTemplate::parse("git clone x \"{path}\"").unwrap(),
            run: Some(CommandTemplate::parse("run {target}").unwrap()),
            update: CommandTemplate::parse("cd \"{path}\" && git pull").unwrap(),
            version: None,
        };
        ToolDescriptor {
            key: "nmap-vulners".to_string(),
            name: "Nmap Vulners".to_string(),
            repo: "vulnersCom/nmap-vulners".to_string(),
            category: ToolCategory::NetworkScan,
            description: "scripts".to_string(),
            templates: CommandTemplates {
                posix: commands.clone(),
                windows: commands,
            },
            install_path: PathBuf::from("/tmp/nmap-vulners"),
            install_method: InstallMethod::GitClone,
            required_files: vec![],
            command_aliases: aliases.into_iter().map(String::from).collect(),
            requires_runtime: false,
        }
    }

    #[test]
    fn test_candidate_commands_default() {
        let tool = sample(vec![]);
        assert_eq!(tool.candidate_commands(), vec!["nmap-vulners", "nmapvulners"]);
    }

    #[test]
    fn test_candidate_commands_aliases() {
        let tool = sample(vec!["vulners"]);
        assert_eq!(tool.candidate_commands(), vec!["vulners"]);
    }

    #[test]
    fn test_validate_rejects_target_outside_run() {
        let mut tool = sample(vec![]);
        assert!(tool.validate().is_ok());

        tool.templates.windows.update = CommandTemplate::parse("update {target}").unwrap();
        assert!(tool.validate().is_err());
    }

    #[test]
    fn test_state_mark_missing_clears_fields() {
        let mut state = ToolState::default();
        state.mark_installed("1.2.3".to_string(), "2026-01-01T00:00:00".to_string());
        assert!(state.installed);

        state.mark_missing();
        assert_eq!(state, ToolState::default());
    }

    #[test]
    fn test_latest_version_not_persisted() {
        let state = ToolState {
            installed: true,
            local_version: "1.0.0".to_string(),
            latest_version: "2.0.0".to_string(),
            last_updated: "t".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("latest_version").is_none());
        assert_eq!(json["local_version"], "1.0.0");
    }

    #[test]
    fn test_status_placeholders() {
        let tool = sample(vec![]);
        let status = ToolStatus::from_parts(&tool, &ToolState::default());
        assert_eq!(status.version, "N/A");
        assert_eq!(status.last_updated, "Never");
        assert_eq!(status.category, "Network Scan");
        assert!(status.requirement.is_none());
    }
}
