//! Tool Manager Module
//!
//! 工具生命周期管理，按职责拆分为多个子模块：
//! - reconcile: 缓存状态与实际可用性对齐
//! - install: 安装 / 批量安装
//! - update: 更新 / 批量更新 / 检查更新 / 状态列表
//! - execute: 执行工具并提取发现

mod execute;
mod install;
mod reconcile;
mod update;

use super::catalog::ToolCatalog;
use super::oracle::{GithubOracle, VersionOracle};
use super::prober::AvailabilityProber;
use super::state::{StateMap, StateStore};
use crate::core::error::{AppError, AppResult};
use crate::models::{AppConfig, ToolDescriptor, ToolState, Timeouts};
use crate::utils::CommandExecutor;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 前置依赖命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    /// 展示名（git / go）
    pub name: String,
    /// 用于检测的命令（退出码 0 视为可用）
    pub probe: String,
    /// 安装提示
    pub hint: String,
}

impl Prerequisite {
    pub fn new(name: &str, probe: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            probe: probe.to_string(),
            hint: hint.to_string(),
        }
    }

    pub fn git() -> Self {
        Self::new("git", "git --version", "https://git-scm.com/downloads")
    }

    pub fn go() -> Self {
        Self::new("go", "go version", "https://go.dev/dl/")
    }
}

/// 生命周期引擎设置
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub tools_dir: PathBuf,
    pub timeouts: Timeouts,
    /// 所有工具安装前都要检查的命令
    pub base_prerequisites: Vec<Prerequisite>,
    /// `requires_runtime` 工具额外需要的工具链
    pub runtime_prerequisite: Option<Prerequisite>,
}

impl ManagerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tools_dir: config.tools_dir.clone(),
            timeouts: config.timeouts,
            base_prerequisites: vec![Prerequisite::git()],
            runtime_prerequisite: Some(Prerequisite::go()),
        }
    }
}

/// 批量操作结果（保持目录顺序）
#[derive(Debug)]
pub struct BatchReport<T> {
    pub entries: Vec<(String, AppResult<T>)>,
}

impl<T> BatchReport<T> {
    /// 每个工具是否成功
    pub fn as_map(&self) -> BTreeMap<String, bool> {
        self.entries
            .iter()
            .map(|(key, result)| (key.clone(), result.is_ok()))
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 工具管理器 - 统一管理工具的安装、更新、执行
///
/// 状态表的所有修改都在同一把写锁下完成，并在持锁期间写回状态文件。
pub struct ToolManager {
    pub(super) catalog: Arc<ToolCatalog>,
    pub(super) states: RwLock<StateMap>,
    pub(super) store: StateStore,
    pub(super) prober: AvailabilityProber,
    pub(super) oracle: Arc<dyn VersionOracle>,
    pub(super) executor: CommandExecutor,
    pub(super) settings: ManagerSettings,
}

impl ToolManager {
    /// 创建管理器：加载状态文件并与实际可用性对齐
    pub fn new(
        catalog: Arc<ToolCatalog>,
        store: StateStore,
        oracle: Arc<dyn VersionOracle>,
        settings: ManagerSettings,
    ) -> Self {
        let executor = CommandExecutor::new();
        let prober = AvailabilityProber::new(executor.clone());

        let mut states = store.load(catalog.keys());
        if reconcile::reconcile_map(&catalog, &prober, &mut states) {
            // 启动时的保存失败不影响后续操作，下一次修改会再次写入
            let _ = store.save(&states);
        }

        tracing::debug!(
            tools = catalog.len(),
            state_file = %store.path().display(),
            "工具管理器初始化完成"
        );

        Self {
            catalog,
            states: RwLock::new(states),
            store,
            prober,
            oracle,
            executor,
            settings,
        }
    }

    /// 按配置构建（内置目录 + GitHub 版本查询）
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let catalog = Arc::new(ToolCatalog::from_config(config)?);
        let oracle: Arc<dyn VersionOracle> = Arc::new(GithubOracle::from_config(config)?);
        Ok(Self::new(
            catalog,
            StateStore::new(config.state_file_path()),
            oracle,
            ManagerSettings::from_config(config),
        ))
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// 查询单个工具状态
    pub async fn state(&self, key: &str) -> AppResult<ToolState> {
        self.catalog.require(key)?;
        Ok(self
            .states
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    /// 所有工具状态的快照
    pub async fn snapshot(&self) -> StateMap {
        self.states.read().await.clone()
    }

    pub(super) fn tool(&self, key: &str) -> AppResult<&ToolDescriptor> {
        self.catalog.require(key)
    }

    /// 在写锁内修改状态并持久化
    ///
    /// 修改先作用在副本上，保存成功后才生效；保存失败时内存状态保持原样。
    pub(super) async fn mutate<R>(
        &self,
        key: &str,
        apply: impl FnOnce(&mut ToolState) -> R,
    ) -> AppResult<R> {
        let mut states = self.states.write().await;
        let mut next = states.get(key).cloned().unwrap_or_default();
        let result = apply(&mut next);
        self.commit(&mut states, key, next)?;
        Ok(result)
    }

    /// 写入单个工具的新状态并保存，保存失败时回滚该条目
    pub(super) fn commit(&self, states: &mut StateMap, key: &str, next: ToolState) -> AppResult<()> {
        let previous = states.insert(key.to_string(), next);
        if let Err(e) = self.store.save(states) {
            match previous {
                Some(state) => states.insert(key.to_string(), state),
                None => states.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    pub(super) fn missing_prerequisite(tool: &ToolDescriptor, prereq: &Prerequisite) -> AppError {
        AppError::MissingPrerequisite {
            tool: tool.name.clone(),
            prerequisite: prereq.name.clone(),
            hint: prereq.hint.clone(),
        }
    }
}

/// 状态时间戳（本地时间，ISO-8601）
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{
        CommandTemplate, CommandTemplates, InstallMethod, PlatformCommands, RemoteVersion,
        ToolCategory,
    };
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// 固定返回值的版本来源，记录查询次数
    pub struct FixedOracle {
        pub version: Option<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FixedOracle {
        pub fn new(version: Option<&str>) -> Self {
            Self {
                version: version.map(String::from),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl VersionOracle for FixedOracle {
        async fn latest(&self, repo: &str) -> Option<RemoteVersion> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(repo.to_string());
            }
            self.version.as_ref().map(|v| RemoteVersion {
                version: v.clone(),
                published_at: String::new(),
                url: String::new(),
                note: String::new(),
            })
        }
    }

    /// 使用 sh 单行命令模拟的工具定义
    pub fn shell_tool(
        key: &str,
        tools_dir: &Path,
        category: ToolCategory,
        method: InstallMethod,
        install: &str,
        run: Option<&str>,
        update: &str,
        version: Option<&str>,
    ) -> ToolDescriptor {
        let commands = PlatformCommands {
            install: CommandTemplate::parse(install).unwrap(),
            run: run.map(|r| CommandTemplate::parse(r).unwrap()),
            update: CommandTemplate::parse(update).unwrap(),
            version: version.map(|v| CommandTemplate::parse(v).unwrap()),
        };
        ToolDescriptor {
            key: key.to_string(),
            name: key.to_uppercase(),
            repo: format!("example/{key}"),
            category,
            description: format!("{key} test tool"),
            templates: CommandTemplates {
                posix: commands.clone(),
                windows: commands,
            },
            install_path: tools_dir.join(key),
            install_method: method,
            required_files: vec![],
            command_aliases: vec![],
            requires_runtime: false,
        }
    }

    pub fn settings(tools_dir: &Path) -> ManagerSettings {
        ManagerSettings {
            tools_dir: tools_dir.to_path_buf(),
            timeouts: Timeouts {
                install_secs: 20,
                command_secs: 20,
                execution_secs: 20,
                oracle_secs: 5,
                strategy_secs: 5,
            },
            base_prerequisites: vec![],
            runtime_prerequisite: None,
        }
    }

    pub fn manager(
        tools_dir: &Path,
        tools: Vec<ToolDescriptor>,
        oracle: Arc<dyn VersionOracle>,
    ) -> ToolManager {
        let catalog = Arc::new(ToolCatalog::from_descriptors(tools).unwrap());
        ToolManager::new(
            catalog,
            StateStore::new(tools_dir.join("tool_state.json")),
            oracle,
            settings(tools_dir),
        )
    }
}
