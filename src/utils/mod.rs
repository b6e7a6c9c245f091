pub mod command;
pub mod config;
pub mod platform;
pub mod text;

pub use command::*;
pub use config::*;
pub use platform::*;
pub use text::*;
