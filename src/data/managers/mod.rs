//! 各格式管理器
//!
//! 目前只有状态文件使用的 JSON 管理器。

pub mod json;

pub use json::JsonManager;
