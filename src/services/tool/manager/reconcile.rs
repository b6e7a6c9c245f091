//! 状态对齐
//!
//! 可用性探测是唯一可信来源，状态文件中的 `installed` 只是缓存。

use super::ToolManager;
use crate::core::error::AppResult;
use crate::models::{ToolDescriptor, ToolState};
use crate::services::tool::catalog::ToolCatalog;
use crate::services::tool::prober::AvailabilityProber;
use crate::services::tool::state::StateMap;

/// 按探测结果修正单个工具状态，返回是否有变化
pub(super) fn reconcile_state(state: &mut ToolState, available: bool) -> bool {
    if available {
        if state.installed {
            return false;
        }
        state.installed = true;
        return true;
    }

    let dirty = state.installed || !state.local_version.is_empty() || !state.last_updated.is_empty();
    if dirty {
        state.mark_missing();
    }
    dirty
}

pub(super) fn reconcile_map(
    catalog: &ToolCatalog,
    prober: &AvailabilityProber,
    states: &mut StateMap,
) -> bool {
    let mut changed = false;
    for tool in catalog.iter() {
        let state = states.entry(tool.key.clone()).or_default();
        if reconcile_state(state, prober.is_available(tool)) {
            tracing::info!(tool = %tool.key, installed = state.installed, "工具状态已与实际安装情况对齐");
            changed = true;
        }
    }
    changed
}

impl ToolManager {
    /// 全量对齐，有变化时持久化
    pub async fn reconcile(&self) -> AppResult<bool> {
        let mut states = self.states.write().await;
        let mut next = states.clone();
        let changed = reconcile_map(&self.catalog, &self.prober, &mut next);
        if changed {
            self.store.save(&next)?;
            *states = next;
        }
        Ok(changed)
    }

    /// 对齐单个工具（更新失败后调用）
    pub(super) async fn reconcile_tool(&self, tool: &ToolDescriptor) -> AppResult<bool> {
        let available = self.prober.is_available(tool);
        self.sync_tool(tool, available).await
    }

    /// 安装失败后清理过期状态：只会把工具改为未安装，不会标记为已安装
    pub(super) async fn clear_stale_tool(&self, tool: &ToolDescriptor) -> AppResult<bool> {
        if self.prober.is_available(tool) {
            return Ok(false);
        }
        self.sync_tool(tool, false).await
    }

    async fn sync_tool(&self, tool: &ToolDescriptor, available: bool) -> AppResult<bool> {
        let mut states = self.states.write().await;
        let mut next = states.get(&tool.key).cloned().unwrap_or_default();
        if !reconcile_state(&mut next, available) {
            return Ok(false);
        }
        self.commit(&mut states, &tool.key, next)?;
        tracing::info!(tool = %tool.key, installed = available, "工具状态已与实际安装情况对齐");
        Ok(true)
    }
}
