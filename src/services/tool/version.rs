use crate::models::{CommandKind, TemplateContext, ToolDescriptor};
use crate::utils::{truncate_chars, CommandExecutor, CommandResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

pub const UNKNOWN_VERSION: &str = "unknown";
pub const INSTALLED_MARKER: &str = "installed";

/// 按优先级排列的版本号模式（大小写不敏感、多行）
static VERSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)v?(\d+\.\d+\.\d+)",
        r"(?im)version[:\s]+(\S+)",
        r"(?im)^([a-f0-9]{7,40})\s*$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// 完整的 git 提交哈希（需截断为 7 位短哈希）
static FULL_COMMIT_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{8,40}$").expect("invalid commit hash regex"));

/// 版本解析器
pub struct VersionResolver;

impl VersionResolver {
    /// 从命令输出中提取版本号
    pub fn parse(output: &str) -> Option<String> {
        VERSION_PATTERNS.iter().find_map(|pattern| {
            let token = pattern.captures(output)?.get(1)?.as_str();
            if FULL_COMMIT_HASH.is_match(token) {
                Some(token[..7].to_string())
            } else {
                Some(token.to_string())
            }
        })
    }

    /// 根据版本命令的执行结果得出版本字符串
    ///
    /// - 命令失败：`unknown`
    /// - 匹配到版本号：版本号
    /// - 未匹配：stdout 去空白后的前 20 个字符，为空时为 `installed`
    pub fn resolve(result: &CommandResult) -> String {
        if !result.success {
            return UNKNOWN_VERSION.to_string();
        }

        if let Some(version) = Self::parse(&result.combined_output()) {
            return version;
        }

        let trimmed = result.stdout.trim();
        if trimmed.is_empty() {
            INSTALLED_MARKER.to_string()
        } else {
            truncate_chars(trimmed, 20)
        }
    }

    /// 执行工具的版本命令并解析版本（没有版本命令时为 `unknown`）
    pub async fn detect(
        executor: &CommandExecutor,
        tool: &ToolDescriptor,
        limit: Duration,
    ) -> String {
        let Some(template) = tool.command(CommandKind::Version) else {
            return UNKNOWN_VERSION.to_string();
        };

        let command = template.render(&TemplateContext::new(&tool.install_path));
        let result = executor.execute_async(&command, limit).await;
        let version = Self::resolve(&result);

        tracing::debug!(tool = %tool.key, version = %version, success = result.success, "本地版本检测完成");
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(stdout: &str, stderr: &str) -> CommandResult {
        CommandResult {
            success: true,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(0),
            timed_out: false,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_semver_patterns() {
        assert_eq!(VersionResolver::parse("1.8.2#stable").as_deref(), Some("1.8.2"));
        assert_eq!(VersionResolver::parse("Nuclei Engine v3.2.4").as_deref(), Some("3.2.4"));
        assert_eq!(
            VersionResolver::parse("Current Version: V2.1.0 (latest)").as_deref(),
            Some("2.1.0")
        );
    }

    #[test]
    fn test_version_keyword_pattern() {
        assert_eq!(VersionResolver::parse("Version: dev-build").as_deref(), Some("dev-build"));
        assert_eq!(VersionResolver::parse("VERSION beta").as_deref(), Some("beta"));
    }

    #[test]
    fn test_commit_hash_truncated() {
        assert_eq!(VersionResolver::parse("a1b2c3d\n").as_deref(), Some("a1b2c3d"));
        assert_eq!(
            VersionResolver::parse("0123456789abcdef0123456789abcdef01234567").as_deref(),
            Some("0123456")
        );
        assert_eq!(VersionResolver::parse("deadbeef99").as_deref(), Some("deadbee"));
    }

    #[test]
    fn test_stderr_is_considered() {
        let result = ok("", "httpx version 1.6.0\n");
        assert_eq!(VersionResolver::resolve(&result), "1.6.0");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            VersionResolver::resolve(&ok("  usage: xsstrike.py [-h] [-u TARGET]  ", "")),
            "usage: xsstrike.py ["
        );
        assert_eq!(VersionResolver::resolve(&ok("", "")), INSTALLED_MARKER);
        assert_eq!(VersionResolver::resolve(&ok(" \n\t", "")), INSTALLED_MARKER);

        let mut failed = ok("1.2.3", "");
        failed.success = false;
        assert_eq!(VersionResolver::resolve(&failed), UNKNOWN_VERSION);
    }
}
