//! JSON 文件管理器
//!
//! 负责 JSON 文件的整文件读写：
//! - 自动创建父目录
//! - 格式化输出，保证人类可读
//! - 先写临时文件再重命名，避免写到一半的文件被读到
//! - Unix 权限设置（0o600）

use crate::data::{DataError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// JSON 文件管理器（无缓存，每次直接读写磁盘）
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManager;

impl JsonManager {
    pub fn new() -> Self {
        Self
    }

    /// 读取整个 JSON 文件
    pub fn read(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 读取并反序列化为指定类型
    pub fn read_as<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let value = self.read(path)?;
        Ok(serde_json::from_value(value)?)
    }

    /// 写入整个 JSON 文件（整体重写）
    pub fn write(&self, path: &Path, value: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
            }
        }

        let content = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| DataError::io(&tmp_path, e))?;
        set_permissions(&tmp_path)?;
        fs::rename(&tmp_path, path).map_err(|e| DataError::io(path, e))?;

        Ok(())
    }

    /// 序列化后写入
    pub fn write_from<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.write(path, &value)
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// 设置文件权限（Unix 平台 0o600）
#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = fs::metadata(path).map_err(|e| DataError::io(path, e))?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms).map_err(|e| DataError::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
