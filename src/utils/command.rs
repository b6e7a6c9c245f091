use super::platform::PlatformInfo;
use std::io;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// 命令执行结果
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    /// 是否因超时被终止（此时不保留任何输出）
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl CommandResult {
    pub fn from_output(output: Output, elapsed: Duration) -> Self {
        CommandResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            timed_out: false,
            elapsed,
        }
    }

    pub fn from_error(error: io::Error, elapsed: Duration) -> Self {
        CommandResult {
            success: false,
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: None,
            timed_out: false,
            elapsed,
        }
    }

    pub fn from_timeout(limit: Duration) -> Self {
        CommandResult {
            success: false,
            stdout: String::new(),
            stderr: format!("命令执行超时（{} 秒）", limit.as_secs()),
            exit_code: None,
            timed_out: true,
            elapsed: limit,
        }
    }

    /// 进程未能启动（既无退出码也未超时）
    pub fn launch_failed(&self) -> bool {
        self.exit_code.is_none() && !self.timed_out && !self.success
    }

    /// stdout + stderr 拼接，用于版本解析
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// 命令执行器
///
/// 所有命令都以 shell 字符串形式执行（`sh -c` / `cmd /C`），stdin 置空，
/// 超时后子进程随 future 一起被丢弃并终止。
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    platform: PlatformInfo,
}

impl CommandExecutor {
    pub fn new() -> Self {
        CommandExecutor {
            platform: PlatformInfo::current(),
        }
    }

    pub fn platform(&self) -> &PlatformInfo {
        &self.platform
    }

    /// 执行命令（使用增强的 PATH）
    pub async fn execute_async(&self, command_str: &str, limit: Duration) -> CommandResult {
        self.execute_in(command_str, None, limit).await
    }

    /// 在指定工作目录下执行命令
    pub async fn execute_in(
        &self,
        command_str: &str,
        cwd: Option<&Path>,
        limit: Duration,
    ) -> CommandResult {
        let (shell, flag) = self.platform.shell();
        let mut command = Command::new(shell);
        command
            .arg(flag)
            .arg(command_str)
            .env("PATH", self.platform.build_enhanced_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            command.creation_flags(0x08000000); // CREATE_NO_WINDOW
        }

        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(command = %command_str, cwd = ?cwd, timeout_secs = limit.as_secs(), "执行命令");

        let started = Instant::now();
        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command = %command_str, error = %e, "命令启动失败");
                return CommandResult::from_error(e, started.elapsed());
            }
        };

        match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = CommandResult::from_output(output, started.elapsed());
                tracing::debug!(
                    command = %command_str,
                    success = result.success,
                    exit_code = ?result.exit_code,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "命令执行完成"
                );
                result
            }
            Ok(Err(e)) => CommandResult::from_error(e, started.elapsed()),
            Err(_) => {
                tracing::warn!(command = %command_str, timeout_secs = limit.as_secs(), "命令执行超时");
                CommandResult::from_timeout(limit)
            }
        }
    }

    /// 检查命令是否可在 PATH（增强后）中解析
    pub fn command_exists(&self, command: &str) -> bool {
        // 从命令字符串中提取命令名（第一个词）
        let cmd_name = command.split_whitespace().next().unwrap_or(command);
        if cmd_name.is_empty() {
            return false;
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir());
        let found = which::which_in(cmd_name, Some(self.platform.build_enhanced_path()), cwd).is_ok();

        tracing::trace!(command = %cmd_name, found, "检查命令是否存在");
        found
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}
