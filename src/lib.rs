// lib.rs - 暴露服务层给 CLI 使用

pub mod core;
pub mod data;
pub mod models;
pub mod services;
pub mod utils;

pub use models::*;
pub use services::scan::{ScanOptions, ScanReport, ScanRunner};
pub use services::strategy::{advisor_from_config, StrategyAdvisor, StrategyRequest};
pub use services::tool::{ToolCatalog, ToolManager};

pub use core::{init_logger, AppError, AppResult};
pub use utils::command::{CommandExecutor, CommandResult};
pub use utils::config::load_config;
