//! 版本检查与更新模块
//!
//! 负责工具的更新、批量更新、检查更新、状态列表

use super::{timestamp, BatchReport, ToolManager};
use crate::core::error::{AppError, AppResult};
use crate::models::{
    CommandKind, TemplateContext, ToolStatus, UpdateAvailable, UpdateOutcome,
};
use crate::utils::truncate_chars;
use futures_util::future::join_all;

impl ToolManager {
    /// 更新工具
    ///
    /// 工具不可用时转为安装；远端版本未知或已是最新时不执行任何命令。
    pub async fn update(&self, key: &str) -> AppResult<UpdateOutcome> {
        let tool = self.tool(key)?;

        if !self.prober.is_available(tool) {
            tracing::info!(tool = %tool.key, "工具未安装或安装不完整，转为安装");
            self.reconcile_tool(tool).await?;
            return self.install(key).await.map(UpdateOutcome::Installed);
        }

        let snapshot = {
            let mut states = self.states.write().await;
            let state = states.entry(tool.key.clone()).or_default();
            state.installed = true;
            state.clone()
        };

        tracing::info!(tool = %tool.key, current = %snapshot.local_version, "检查更新");
        let check = self.oracle.needs_update(&snapshot, &tool.repo).await;

        if !check.needs_update {
            if check.latest_version.is_empty() {
                tracing::warn!(tool = %tool.key, note = %check.note, "无法获取远端版本，跳过更新");
                return Ok(UpdateOutcome::Unknown { note: check.note });
            }
            let latest = check.latest_version.clone();
            if let Some(state) = self.states.write().await.get_mut(&tool.key) {
                state.latest_version = latest;
            }
            tracing::info!(tool = %tool.key, latest = %check.latest_version, "已是最新版本");
            return Ok(UpdateOutcome::UpToDate {
                latest: check.latest_version,
                note: check.note,
            });
        }

        tracing::info!(tool = %tool.key, note = %check.note, "发现新版本");

        let command = tool
            .command(CommandKind::Update)
            .map(|t| t.render(&TemplateContext::new(&tool.install_path)))
            .unwrap_or_default();
        let cwd = tool
            .install_path
            .exists()
            .then_some(tool.install_path.as_path());

        tracing::info!(tool = %tool.key, command = %command, "执行更新命令");
        let result = self
            .executor
            .execute_in(&command, cwd, self.settings.timeouts.command())
            .await;

        if !result.success {
            self.reconcile_tool(tool).await?;
            tracing::warn!(tool = %tool.key, exit_code = ?result.exit_code, "更新失败");
            return Err(AppError::UpdateFailed {
                tool: tool.name.clone(),
                stderr: truncate_chars(&result.stderr, 200),
            });
        }

        let latest = check.latest_version;
        let stamp = timestamp();
        let recorded = latest.clone();
        let previous = self
            .mutate(&tool.key, move |state| {
                let previous = std::mem::replace(&mut state.local_version, recorded.clone());
                state.latest_version = recorded;
                state.last_updated = stamp;
                previous
            })
            .await?;

        tracing::info!(tool = %tool.key, previous = %previous, current = %latest, "工具更新成功");
        Ok(UpdateOutcome::Updated {
            previous,
            current: latest,
        })
    }

    /// 更新所有已安装的工具，单个失败不影响其他工具
    pub async fn update_all(&self) -> BatchReport<UpdateOutcome> {
        let installed: Vec<String> = {
            let states = self.states.read().await;
            self.catalog
                .keys()
                .filter(|key| states.get(*key).is_some_and(|s| s.installed))
                .map(str::to_string)
                .collect()
        };

        tracing::info!(count = installed.len(), "开始批量更新");

        let mut entries = Vec::with_capacity(installed.len());
        for key in installed {
            let result = self.update(&key).await;
            entries.push((key, result));
        }
        BatchReport { entries }
    }

    /// 检查所有工具的更新（只读：不修改状态、不执行命令）
    pub async fn check_all(&self) -> Vec<UpdateAvailable> {
        let snapshot = self.snapshot().await;

        let checks = self.catalog.iter().map(|tool| {
            let state = snapshot.get(&tool.key).cloned().unwrap_or_default();
            async move {
                let check = self.oracle.needs_update(&state, &tool.repo).await;
                (tool, state, check)
            }
        });

        join_all(checks)
            .await
            .into_iter()
            .filter(|(_, _, check)| check.needs_update)
            .map(|(tool, state, check)| UpdateAvailable {
                name: tool.name.clone(),
                key: tool.key.clone(),
                current: state.local_version,
                latest: check.latest_version,
                note: check.note,
            })
            .collect()
    }

    /// 所有工具的展示状态（目录顺序）
    pub async fn status(&self) -> Vec<ToolStatus> {
        let states = self.states.read().await;
        self.catalog
            .iter()
            .map(|tool| {
                let state = states.get(&tool.key).cloned().unwrap_or_default();
                ToolStatus::from_parts(tool, &state)
            })
            .collect()
    }
}
