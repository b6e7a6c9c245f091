//! 数据管理模块
//!
//! 提供状态文件等 JSON 数据的统一读写接口。
//!
//! - `error`: 数据层错误类型
//! - `managers`: 各格式管理器（JSON）

pub mod error;
pub mod managers;

pub use error::{DataError, Result};
pub use managers::JsonManager;
