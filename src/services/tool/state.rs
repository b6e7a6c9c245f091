//! 工具状态持久化
//!
//! 状态文件为 JSON 对象：`key -> {installed, local_version, last_updated}`，每次整体重写。

use crate::core::error::AppResult;
use crate::data::{DataError, JsonManager};
use crate::models::ToolState;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub type StateMap = BTreeMap<String, ToolState>;

/// 状态存储
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    json: JsonManager,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            json: JsonManager::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 加载状态
    ///
    /// 每个已知 key 都有一条记录；文件缺失或损坏时返回默认状态（不报错），
    /// 文件中的未知 key 会被忽略。
    pub fn load<'a, I>(&self, keys: I) -> StateMap
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut states: StateMap = keys
            .into_iter()
            .map(|k| (k.to_string(), ToolState::default()))
            .collect();

        if !self.json.exists(&self.path) {
            tracing::debug!(path = %self.path.display(), "状态文件不存在，使用默认状态");
            return states;
        }

        let stored = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "状态文件读取失败，使用默认状态");
                return states;
            }
        };

        for (key, value) in stored {
            let Some(slot) = states.get_mut(&key) else {
                tracing::debug!(tool = %key, "忽略状态文件中的未知工具");
                continue;
            };
            match serde_json::from_value::<ToolState>(value) {
                Ok(state) => *slot = state,
                Err(e) => tracing::warn!(tool = %key, error = %e, "工具状态记录格式错误，已忽略"),
            }
        }

        states
    }

    fn read_entries(&self) -> Result<serde_json::Map<String, Value>, DataError> {
        match self.json.read(&self.path)? {
            Value::Object(map) => Ok(map),
            other => Err(DataError::Malformed(format!(
                "状态文件顶层应为对象，实际为 {}",
                json_kind(&other)
            ))),
        }
    }

    /// 整体写入状态文件
    pub fn save(&self, states: &StateMap) -> AppResult<()> {
        self.json.write_from(&self.path, states).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "状态文件保存失败");
            e.into()
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
