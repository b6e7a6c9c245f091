//! 远端版本查询
//!
//! 查询托管仓库 API 的最新 release，没有 release 时退回最新提交。
//! 网络错误不会向外传播：记录 warn 日志后返回 `None`。

use crate::core::error::AppResult;
use crate::core::http::build_http_client;
use crate::models::{AppConfig, RemoteVersion, ToolState, UpdateCheck};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const NOTE_UNAVAILABLE: &str = "Could not fetch version info";
pub const NOTE_UP_TO_DATE: &str = "up to date";

/// 远端版本来源
#[async_trait]
pub trait VersionOracle: Send + Sync {
    /// 查询仓库最新版本，失败时返回 `None`
    async fn latest(&self, repo: &str) -> Option<RemoteVersion>;

    /// 判断本地版本是否需要更新
    async fn needs_update(&self, state: &ToolState, repo: &str) -> UpdateCheck {
        compare_with_remote(state, self.latest(repo).await)
    }
}

/// 本地状态与远端版本比较
pub fn compare_with_remote(state: &ToolState, remote: Option<RemoteVersion>) -> UpdateCheck {
    let Some(remote) = remote else {
        return UpdateCheck {
            needs_update: false,
            latest_version: String::new(),
            note: NOTE_UNAVAILABLE.to_string(),
        };
    };

    if !state.local_version.is_empty() && state.local_version == remote.version {
        return UpdateCheck {
            needs_update: false,
            latest_version: remote.version,
            note: NOTE_UP_TO_DATE.to_string(),
        };
    }

    let current = if state.local_version.is_empty() {
        "Not installed"
    } else {
        state.local_version.as_str()
    };
    UpdateCheck {
        needs_update: true,
        note: format!("Latest: {} (Current: {})", remote.version, current),
        latest_version: remote.version,
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    #[serde(default)]
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    #[serde(default)]
    html_url: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    #[serde(default)]
    date: String,
}

/// GitHub REST API 实现
#[derive(Debug, Clone)]
pub struct GithubOracle {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubOracle {
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(
            &config.github_api_base,
            config.github_token.clone(),
            config.timeouts.oracle(),
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json");
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }

    async fn latest_release(&self, repo: &str) -> Result<Option<RemoteVersion>, reqwest::Error> {
        let url = format!("{}/repos/{}/releases/latest", self.api_base, repo);
        let response = self.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let release: ReleaseResponse = response.json().await?;
                if release.tag_name.is_empty() {
                    return Ok(None);
                }
                Ok(Some(RemoteVersion {
                    version: release.tag_name,
                    published_at: release.published_at.unwrap_or_default(),
                    url: release.html_url,
                    note: truncate_chars(release.body.as_deref().unwrap_or_default(), 500),
                }))
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(repo = %repo, "仓库没有 release，改用最新提交");
                self.latest_commit(repo).await
            }
            status => {
                tracing::warn!(repo = %repo, status = %status, "查询最新 release 失败");
                Ok(None)
            }
        }
    }

    async fn latest_commit(&self, repo: &str) -> Result<Option<RemoteVersion>, reqwest::Error> {
        let url = format!("{}/repos/{}/commits", self.api_base, repo);
        let response = self.get(&url).query(&[("per_page", "1")]).send().await?;

        if response.status() != StatusCode::OK {
            tracing::warn!(repo = %repo, status = %response.status(), "查询最新提交失败");
            return Ok(None);
        }

        let commits: Vec<CommitEntry> = response.json().await?;
        Ok(commits.into_iter().next().map(|entry| RemoteVersion {
            version: truncate_chars(&entry.sha, 7),
            published_at: entry
                .commit
                .committer
                .map(|c| c.date)
                .unwrap_or_default(),
            url: entry.html_url,
            note: truncate_chars(&entry.commit.message, 200),
        }))
    }
}

#[async_trait]
impl VersionOracle for GithubOracle {
    async fn latest(&self, repo: &str) -> Option<RemoteVersion> {
        match self.latest_release(repo).await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(repo = %repo, error = %e, "远端版本查询失败");
                None
            }
        }
    }
}
