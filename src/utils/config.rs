use crate::core::error::{AppError, AppResult};
use crate::data::{DataError, JsonManager};
use crate::models::AppConfig;
use std::path::{Path, PathBuf};

pub const ENV_TOOLS_DIR: &str = "ARSENAL_TOOLS_DIR";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// 配置目录 (~/.arsenal)
pub fn config_dir() -> AppResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| AppError::Config {
        reason: "无法获取用户主目录".to_string(),
    })?;
    Ok(home_dir.join(".arsenal"))
}

/// 全局配置文件路径
pub fn global_config_path() -> AppResult<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// 加载配置并应用环境变量覆盖
///
/// - 显式指定的配置文件必须可读且格式正确，否则返回错误
/// - 默认位置的配置文件不存在时使用默认值，损坏时记录警告并使用默认值
pub fn load_config(explicit: Option<&Path>) -> AppResult<AppConfig> {
    let mut config = match explicit {
        Some(path) => read_config_file(path)?,
        None => match global_config_path() {
            Ok(path) if path.exists() => read_config_file(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "配置文件无法解析，使用默认配置");
                AppConfig::default()
            }),
            _ => AppConfig::default(),
        },
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn read_config_file(path: &Path) -> AppResult<AppConfig> {
    JsonManager::new()
        .read_as::<AppConfig>(path)
        .map_err(|e| match e {
            DataError::Io { source, .. } => AppError::Config {
                reason: format!("无法读取配置文件 {}: {source}", path.display()),
            },
            other => AppError::Config {
                reason: format!("配置文件格式错误 {}: {other}", path.display()),
            },
        })
}

/// 从进程环境变量覆盖配置
pub fn apply_env_overrides(config: &mut AppConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// 使用给定的查找函数覆盖配置（空值视为未设置）
pub fn apply_overrides_from<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(dir) = get(ENV_TOOLS_DIR) {
        config.tools_dir = PathBuf::from(dir);
    }
    if let Some(token) = get(ENV_GITHUB_TOKEN) {
        config.github_token = Some(token);
    }
    if let Some(key) = get(ENV_ANTHROPIC_API_KEY) {
        config.anthropic_api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TOOLS_DIR, "/srv/tools"),
            (ENV_GITHUB_TOKEN, "ghp_test"),
            (ENV_ANTHROPIC_API_KEY, "  "),
        ]);
        let mut config = AppConfig::default();
        apply_overrides_from(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.tools_dir, PathBuf::from("/srv/tools"));
        assert_eq!(config.github_token.as_deref(), Some("ghp_test"));
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_load_explicit_config_with_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"python_command":"python3.12","github_token":"from-file"}"#)
            .unwrap();

        std::env::set_var(ENV_GITHUB_TOKEN, "from-env");
        std::env::remove_var(ENV_TOOLS_DIR);
        let config = load_config(Some(&path)).unwrap();
        std::env::remove_var(ENV_GITHUB_TOKEN);

        assert_eq!(config.python_command, "python3.12");
        assert_eq!(config.github_token.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("nope.json"))).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    #[serial]
    fn test_explicit_corrupt_config_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
