pub mod config;
pub mod execution;
pub mod plan;
pub mod template;
pub mod tool;
pub mod update;

pub use config::*;
pub use execution::*;
pub use plan::*;
pub use template::{CommandKind, CommandTemplate, TemplateContext};
pub use tool::*;
pub use update::*;
