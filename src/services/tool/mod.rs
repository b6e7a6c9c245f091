// 工具服务模块
//
// 包含工具目录、可用性探测、状态持久化、版本查询、生命周期管理与执行

pub mod catalog;
pub mod findings;
pub mod manager;
pub mod oracle;
pub mod prober;
pub mod state;
pub mod version;

pub use catalog::ToolCatalog;
pub use findings::FindingExtractor;
pub use manager::{BatchReport, ManagerSettings, Prerequisite, ToolManager};
pub use oracle::{GithubOracle, VersionOracle};
pub use prober::AvailabilityProber;
pub use state::{StateMap, StateStore};
pub use version::VersionResolver;
