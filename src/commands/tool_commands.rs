mod installation;
mod update;

pub use installation::*;
pub use update::*;

use ::arsenal::models::ToolStatus;
use ::arsenal::services::tool::ToolManager;

const TABLE_WIDTH: usize = 95;

/// 渲染工具列表
pub fn render_status_table(status: &[ToolStatus]) -> String {
    let mut out = String::new();
    out.push_str("\n[*] 安全工具列表\n");
    out.push_str(&"=".repeat(TABLE_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "{:<18} {:<15} {:<10} {:<12} {:<20}\n",
        "Name", "Type", "Status", "Version", "Requirements"
    ));
    out.push_str(&"-".repeat(TABLE_WIDTH));
    out.push('\n');

    for tool in status {
        let icon = if tool.installed { "[OK]" } else { "[X]" };
        out.push_str(&format!(
            "{:<18} {:<15} {:<10} {:<12} {:<20}\n",
            tool.name,
            tool.category,
            icon,
            tool.version,
            tool.requirement.as_deref().unwrap_or("-")
        ));
    }
    out.push_str(&"=".repeat(TABLE_WIDTH));
    out.push('\n');
    out
}

/// 工具展示名（未知 key 原样返回）
fn display_name(manager: &ToolManager, key: &str) -> String {
    manager
        .catalog()
        .get(key)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| key.to_string())
}

/// `list`：展示所有工具状态
pub async fn list_tools(manager: &ToolManager) {
    let status = manager.status().await;
    print!("{}", render_status_table(&status));
}
