use std::path::PathBuf;

use ::arsenal::models::{AppConfig, LogLevel};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "arsenal", version)]
#[command(about = "安全工具武器库：安装、更新、版本追踪与扫描编排")]
pub struct Cli {
    /// 配置文件路径（默认 ~/.arsenal/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 工具安装目录
    #[arg(long, global = true, env = "ARSENAL_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// 日志级别（trace / debug / info / warn / error）
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 列出所有工具及安装状态
    #[command(visible_alias = "ls")]
    List,
    /// 安装指定工具
    Install { tool: String },
    /// 按顺序安装所有工具
    InstallAll,
    /// 更新指定工具（未安装时转为安装）
    Update { tool: String },
    /// 更新所有已安装的工具
    UpdateAll,
    /// 检查所有工具是否有新版本
    Check,
    /// 生成扫描策略并按策略执行工具
    Scan {
        target: String,
        /// 补充给策略分析的上下文
        #[arg(long)]
        context: Option<String>,
        /// 跳过确认直接开始扫描
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
        /// 推荐的工具未安装时先安装
        #[arg(long, default_value_t = false)]
        install_missing: bool,
    },
}

impl Cli {
    /// 命令行参数优先级最高，覆盖配置文件和环境变量
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.tools_dir {
            config.tools_dir = dir.clone();
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::try_parse_from([
            "arsenal",
            "--log-level",
            "debug",
            "scan",
            "https://example.test/?id=1",
            "--yes",
            "--install-missing",
            "--context",
            "PHP backend",
        ])
        .unwrap();

        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Scan {
                target,
                context,
                yes,
                install_missing,
            } => {
                assert_eq!(target, "https://example.test/?id=1");
                assert_eq!(context.as_deref(), Some("PHP backend"));
                assert!(yes);
                assert!(install_missing);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_argument_is_usage_error() {
        assert!(Cli::try_parse_from(["arsenal", "install"]).is_err());
        assert!(Cli::try_parse_from(["arsenal", "scan"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from(["arsenal", "--tools-dir", "/opt/arsenal", "list"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.tools_dir, PathBuf::from("/opt/arsenal"));
    }
}
