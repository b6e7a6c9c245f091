use ::arsenal::core::AppError;
use ::arsenal::models::InstallOutcome;
use super::display_name;
use ::arsenal::services::tool::ToolManager;

/// 安装结果的提示信息
pub fn describe_install(name: &str, result: &Result<InstallOutcome, AppError>) -> String {
    match result {
        Ok(InstallOutcome::AlreadyInstalled { version }) => {
            format!("✅ {name} 已安装（版本 {version}），无需重复安装")
        }
        Ok(InstallOutcome::Installed { version }) => {
            format!("✅ {name} 安装成功！版本: {version}")
        }
        Err(AppError::InstallFailed {
            exit_code,
            stderr,
            stdout,
            ..
        }) => {
            let mut message = match exit_code {
                Some(code) => format!("❌ {name} 安装失败（退出码 {code}）"),
                None => format!("❌ {name} 安装失败"),
            };
            if !stderr.trim().is_empty() {
                message.push_str(&format!("\n   stderr: {}", stderr.trim()));
            }
            if !stdout.trim().is_empty() {
                message.push_str(&format!("\n   stdout: {}", stdout.trim()));
            }
            message
        }
        Err(e) => format!("❌ {e}"),
    }
}

/// `install <tool>`
pub async fn install_tool(manager: &ToolManager, key: &str) {
    let key = key.to_lowercase();
    let name = display_name(manager, &key);
    println!("\n[*] 正在安装 {name} ...");
    let result = manager.install(&key).await;
    println!("{}", describe_install(&name, &result));
}

/// `install-all`
pub async fn install_all_tools(manager: &ToolManager) {
    println!("\n[*] 开始安装所有工具 ...");
    let report = manager.install_all().await;
    for (key, result) in &report.entries {
        println!("{}", describe_install(&display_name(manager, key), result));
    }
    println!(
        "\n[*] 安装完成：{}/{} 成功",
        report.success_count(),
        report.len()
    );
}
