// arsenal 命令行入口
mod commands;

use ::arsenal::{init_logger, load_config};
use clap::Parser;
use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 显式指定的配置文件读取失败时直接退出
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    if let Err(e) = init_logger(&config.log) {
        eprintln!("日志系统初始化失败: {e}");
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        tools_dir = %config.tools_dir.display(),
        "arsenal 启动"
    );

    commands::dispatch(cli.command, &config).await
}
