//! 安装模块

use super::{timestamp, BatchReport, ToolManager};
use crate::core::error::{AppError, AppResult};
use crate::models::{CommandKind, InstallOutcome, TemplateContext, ToolDescriptor};
use crate::services::tool::version::VersionResolver;
use crate::utils::truncate_chars;

impl ToolManager {
    /// 安装工具
    ///
    /// 已可用时直接视为成功，不会再次执行安装命令。
    /// 安装命令退出码为 0 且探测通过才算成功；失败时状态保持不变。
    pub async fn install(&self, key: &str) -> AppResult<InstallOutcome> {
        let tool = self.tool(key)?;
        tracing::info!(tool = %tool.key, name = %tool.name, "开始安装工具");

        self.check_prerequisites(tool).await?;

        if self.prober.is_available(tool) {
            return self.adopt_existing(tool).await;
        }

        if tool.is_git_clone() && tool.install_path.exists() {
            tracing::warn!(
                tool = %tool.key,
                path = %tool.install_path.display(),
                "发现不完整的安装目录，删除后重新安装"
            );
            std::fs::remove_dir_all(&tool.install_path).map_err(|source| AppError::Cleanup {
                path: tool.install_path.clone(),
                source,
            })?;
        }

        std::fs::create_dir_all(&self.settings.tools_dir)
            .map_err(|e| AppError::io(&self.settings.tools_dir, e))?;

        let command = tool
            .command(CommandKind::Install)
            .map(|t| t.render(&TemplateContext::new(&tool.install_path)))
            .unwrap_or_default();
        let cwd = tool.is_git_clone().then_some(self.settings.tools_dir.as_path());

        tracing::info!(tool = %tool.key, command = %command, "执行安装命令");
        let result = self
            .executor
            .execute_in(&command, cwd, self.settings.timeouts.install())
            .await;

        if !result.success {
            if tool.is_git_clone() {
                self.remove_partial_clone(tool);
            }
            self.clear_stale_tool(tool).await?;
            let err = AppError::InstallFailed {
                tool: tool.name.clone(),
                exit_code: result.exit_code,
                stderr: truncate_chars(&result.stderr, 300),
                stdout: truncate_chars(&result.stdout, 200),
            };
            tracing::warn!(tool = %tool.key, exit_code = ?result.exit_code, timed_out = result.timed_out, "安装失败");
            return Err(err);
        }

        if !self.prober.is_available(tool) {
            self.clear_stale_tool(tool).await?;
            tracing::warn!(tool = %tool.key, "安装命令成功但未检测到可用安装");
            return Err(AppError::NotAvailableAfterInstall {
                tool: tool.name.clone(),
                path: tool.install_path.clone(),
            });
        }

        let version =
            VersionResolver::detect(&self.executor, tool, self.settings.timeouts.command()).await;
        let stamp = timestamp();
        let recorded = version.clone();
        self.mutate(&tool.key, move |state| state.mark_installed(recorded, stamp))
            .await?;

        tracing::info!(tool = %tool.key, version = %version, "工具安装成功");
        Ok(InstallOutcome::Installed { version })
    }

    /// 按目录顺序安装所有工具，单个失败不影响其他工具
    pub async fn install_all(&self) -> BatchReport<InstallOutcome> {
        let mut entries = Vec::with_capacity(self.catalog.len());
        for key in self.catalog.keys() {
            let result = self.install(key).await;
            entries.push((key.to_string(), result));
        }
        BatchReport { entries }
    }

    /// 删除安装失败留下的克隆目录（安装前已清理过旧目录，此处的内容都来自本次失败的安装）
    fn remove_partial_clone(&self, tool: &ToolDescriptor) {
        if !tool.install_path.exists() {
            return;
        }
        match std::fs::remove_dir_all(&tool.install_path) {
            Ok(()) => tracing::warn!(
                tool = %tool.key,
                path = %tool.install_path.display(),
                "已删除安装失败留下的不完整目录"
            ),
            Err(e) => tracing::warn!(
                tool = %tool.key,
                path = %tool.install_path.display(),
                error = %e,
                "删除不完整安装目录失败"
            ),
        }
    }

    /// 已可用的工具：标记为已安装，必要时补全版本和时间戳
    async fn adopt_existing(&self, tool: &ToolDescriptor) -> AppResult<InstallOutcome> {
        let known_version = {
            let states = self.states.read().await;
            states
                .get(&tool.key)
                .map(|s| s.local_version.clone())
                .filter(|v| !v.is_empty())
        };

        let resolved = match known_version {
            Some(_) => None,
            None => Some(
                VersionResolver::detect(&self.executor, tool, self.settings.timeouts.command())
                    .await,
            ),
        };

        let version = self
            .mutate(&tool.key, |state| {
                state.installed = true;
                if let Some(version) = resolved {
                    state.local_version = version;
                }
                if state.last_updated.is_empty() {
                    state.last_updated = timestamp();
                }
                state.local_version.clone()
            })
            .await?;

        tracing::info!(
            tool = %tool.key,
            path = %tool.install_path.display(),
            version = %version,
            "工具已安装，跳过安装命令"
        );
        Ok(InstallOutcome::AlreadyInstalled { version })
    }

    /// 检查前置依赖命令
    async fn check_prerequisites(&self, tool: &ToolDescriptor) -> AppResult<()> {
        let runtime = self
            .settings
            .runtime_prerequisite
            .iter()
            .filter(|_| tool.requires_runtime);

        for prereq in self.settings.base_prerequisites.iter().chain(runtime) {
            let result = self
                .executor
                .execute_async(&prereq.probe, self.settings.timeouts.command())
                .await;
            if !result.success {
                tracing::warn!(tool = %tool.key, prerequisite = %prereq.name, "缺少前置依赖");
                return Err(Self::missing_prerequisite(tool, prereq));
            }
        }
        Ok(())
    }
}
