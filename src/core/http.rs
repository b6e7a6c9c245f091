use crate::core::error::{AppError, AppResult};
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("arsenal/", env!("CARGO_PKG_VERSION"));

/// 构建 HTTP 客户端
///
/// 代理沿用 reqwest 的环境变量约定（HTTP_PROXY / HTTPS_PROXY / ALL_PROXY，支持 socks5）。
pub fn build_http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| AppError::Config {
            reason: format!("HTTP 客户端初始化失败: {e}"),
        })
}
