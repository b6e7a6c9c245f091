pub mod cli;
pub mod scan_commands;
pub mod tool_commands;

pub use cli::{Cli, Commands};
pub use scan_commands::*;
pub use tool_commands::*;

use ::arsenal::models::AppConfig;
use ::arsenal::services::tool::ToolManager;

/// 分发子命令
///
/// 只有配置 / 目录加载失败才返回错误；单个工具安装或更新失败只打印状态。
pub async fn dispatch(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    let manager = ToolManager::from_config(config)?;

    match command {
        Commands::List => list_tools(&manager).await,
        Commands::Install { tool } => install_tool(&manager, &tool).await,
        Commands::InstallAll => install_all_tools(&manager).await,
        Commands::Update { tool } => update_tool(&manager, &tool).await,
        Commands::UpdateAll => update_all_tools(&manager).await,
        Commands::Check => check_updates(&manager).await,
        Commands::Scan {
            target,
            context,
            yes,
            install_missing,
        } => {
            let options = ScanCommandOptions {
                context,
                assume_yes: yes,
                install_missing,
            };
            scan_target(&manager, config, &target, options).await?;
        }
    }
    Ok(())
}
