//! 工具执行模块

use super::ToolManager;
use crate::models::{CommandKind, ExecutionResult, TemplateContext};
use crate::services::tool::findings::FindingExtractor;
use crate::utils::CommandResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static REPEATED_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("正则表达式编译失败"));

/// 超时说明（整分钟时按分钟显示）
fn timeout_message(limit: Duration) -> String {
    let secs = limit.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("Execution timed out ({} minutes)", secs / 60)
    } else {
        format!("Execution timed out ({secs} seconds)")
    }
}

impl ToolManager {
    /// 对目标执行工具
    ///
    /// 前置条件不满足时不会抛出错误，而是返回带说明的失败结果。
    /// 已标记安装但探测失败时，会顺带把状态修正为未安装并写回。
    pub async fn execute(
        &self,
        key: &str,
        target: &str,
        extra_args: Option<&str>,
    ) -> ExecutionResult {
        let Ok(tool) = self.tool(key) else {
            return ExecutionResult::rejected(key, String::new(), format!("Unknown tool: {key}"));
        };

        let installed = self
            .states
            .read()
            .await
            .get(&tool.key)
            .is_some_and(|s| s.installed);
        if !installed {
            return ExecutionResult::rejected(
                key,
                String::new(),
                format!("{} is not installed", tool.name),
            );
        }

        if !self.prober.is_available(tool) {
            tracing::warn!(tool = %tool.key, path = %tool.install_path.display(), "状态显示已安装，但实际安装不完整");
            // 保存失败已在 store 中记录，这里仍返回失败结果
            let _ = self.mutate(&tool.key, |state| state.mark_missing()).await;
            return ExecutionResult::rejected(
                key,
                String::new(),
                format!(
                    "{} installation is incomplete. Run: arsenal install {}",
                    tool.name, tool.key
                ),
            );
        }

        let Some(template) = tool.command(CommandKind::Run) else {
            return ExecutionResult::rejected(
                key,
                String::new(),
                format!("{} has no run command configured", tool.name),
            );
        };

        let rendered = template.render(&TemplateContext::new(&tool.install_path).with_target(target));
        let mut command = REPEATED_SPACES.replace_all(&rendered, " ").trim().to_string();
        if let Some(extra) = extra_args.filter(|a| !a.trim().is_empty()) {
            command.push(' ');
            command.push_str(extra);
        }

        let limit = self.settings.timeouts.execution();
        tracing::info!(tool = %tool.key, target = %target, command = %command, "执行工具");
        let result = self.executor.execute_async(&command, limit).await;

        let findings = if result.success {
            FindingExtractor::extract(tool.category, &result.stdout)
        } else {
            Vec::new()
        };

        let error = failure_message(&tool.name, &result, limit);
        tracing::info!(
            tool = %tool.key,
            success = result.success,
            exit_code = ?result.exit_code,
            findings = findings.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "工具执行完成"
        );

        ExecutionResult {
            tool_key: tool.key.clone(),
            command,
            success: result.success,
            stdout: result.stdout,
            stderr: result.stderr,
            error,
            elapsed: result.elapsed,
            findings,
        }
    }
}

fn failure_message(name: &str, result: &CommandResult, limit: Duration) -> String {
    if result.success {
        String::new()
    } else if result.timed_out {
        timeout_message(limit)
    } else if result.launch_failed() {
        result.stderr.trim().to_string()
    } else {
        match result.exit_code {
            Some(code) => format!("{name} exited with code {code}"),
            None => format!("{name} was terminated by a signal"),
        }
    }
}
