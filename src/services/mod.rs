// 服务层模块
//
// - tool: 工具目录、生命周期管理、执行
// - strategy: 扫描策略（LLM / 规则）
// - scan: 按策略编排执行

pub mod scan;
pub mod strategy;
pub mod tool;

pub use scan::{ScanOptions, ScanReport, ScanRunner, SeveritySummary, SkippedTool};
pub use strategy::{advisor_from_config, LlmAdvisor, RuleBasedAdvisor, StrategyAdvisor, StrategyRequest};
pub use tool::{ToolCatalog, ToolManager};
