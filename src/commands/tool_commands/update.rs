use super::installation::describe_install;
use ::arsenal::core::AppError;
use ::arsenal::models::{UpdateAvailable, UpdateOutcome};
use super::display_name;
use ::arsenal::services::tool::ToolManager;

/// 更新结果的提示信息
pub fn describe_update(name: &str, result: &Result<UpdateOutcome, AppError>) -> String {
    match result {
        Ok(UpdateOutcome::Installed(outcome)) => describe_install(name, &Ok(outcome.clone())),
        Ok(UpdateOutcome::UpToDate { latest, .. }) => {
            format!("✅ {name} 已是最新版本 ({latest})")
        }
        Ok(UpdateOutcome::Unknown { note }) => format!("⚠️  {name} 无法获取远端版本: {note}"),
        Ok(UpdateOutcome::Updated { previous, current }) => {
            let previous = if previous.is_empty() { "unknown" } else { previous };
            format!("✅ {name} 更新成功：{previous} -> {current}")
        }
        Err(e) => format!("❌ {e}"),
    }
}

/// 渲染可用更新列表
pub fn render_updates(updates: &[UpdateAvailable]) -> String {
    if updates.is_empty() {
        return "\n[OK] 所有工具都是最新版本！\n".to_string();
    }

    let mut out = String::from("\n[*] 以下工具有可用更新:\n");
    for update in updates {
        let current = if update.current.is_empty() {
            "未安装"
        } else {
            update.current.as_str()
        };
        out.push_str(&format!("   - {}: {} -> {}\n", update.name, current, update.latest));
    }
    out
}

/// `update <tool>`
pub async fn update_tool(manager: &ToolManager, key: &str) {
    let key = key.to_lowercase();
    let name = display_name(manager, &key);
    println!("\n[*] 正在检查 {name} 的更新 ...");
    let result = manager.update(&key).await;
    println!("{}", describe_update(&name, &result));
}

/// `update-all`
pub async fn update_all_tools(manager: &ToolManager) {
    println!("\n[*] 开始更新所有已安装的工具 ...");
    let report = manager.update_all().await;
    if report.is_empty() {
        println!("没有已安装的工具");
        return;
    }
    for (key, result) in &report.entries {
        println!("{}", describe_update(&display_name(manager, key), result));
    }
    println!(
        "\n[*] 更新完成：{}/{} 成功",
        report.success_count(),
        report.len()
    );
}

/// `check`
pub async fn check_updates(manager: &ToolManager) {
    println!("\n[*] 正在检查更新 ...");
    let updates = manager.check_all().await;
    print!("{}", render_updates(&updates));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_updates() {
        assert!(render_updates(&[]).contains("最新版本"));

        let rendered = render_updates(&[UpdateAvailable {
            name: "Nuclei".to_string(),
            key: "nuclei".to_string(),
            current: "1.0.0".to_string(),
            latest: "2.0.0".to_string(),
            note: String::new(),
        }]);
        assert!(rendered.contains("Nuclei: 1.0.0 -> 2.0.0"));
    }

    #[test]
    fn test_describe_update() {
        let updated = describe_update(
            "HTTPX",
            &Ok(UpdateOutcome::Updated {
                previous: String::new(),
                current: "v1.6.0".to_string(),
            }),
        );
        assert!(updated.contains("unknown -> v1.6.0"));

        let unknown = describe_update(
            "HTTPX",
            &Ok(UpdateOutcome::Unknown {
                note: "Could not fetch version info".to_string(),
            }),
        );
        assert!(unknown.contains("Could not fetch version info"));
    }
}
