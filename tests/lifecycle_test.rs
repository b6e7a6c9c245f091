//! 生命周期端到端测试：JSON 工具目录 + sh 模拟安装器 + 模拟 GitHub API
#![cfg(unix)]

use arsenal::models::{InstallOutcome, UpdateOutcome};
use arsenal::services::tool::{
    GithubOracle, ManagerSettings, StateStore, ToolCatalog, ToolManager, VersionOracle,
};
use arsenal::{AppError, Timeouts};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn commands(install: &str, run: Option<&str>, update: &str, version: Option<&str>) -> Value {
    let mut value = json!({ "install": install, "update": update });
    if let Some(run) = run {
        value["run"] = json!(run);
    }
    if let Some(version) = version {
        value["version"] = json!(version);
    }
    json!({ "posix": value.clone(), "windows": value })
}

fn entry(key: &str, method: &str, templates: Value) -> Value {
    json!({
        "key": key,
        "name": key.to_uppercase(),
        "repo": format!("acme/{key}"),
        "category": "Recon",
        "description": format!("{key} fixture"),
        "templates": templates,
        "install_path": key,
        "install_method": method,
    })
}

fn write_catalog(dir: &Path, entries: Vec<Value>) -> ToolCatalog {
    let catalog_path = dir.join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    ToolCatalog::load_json(&catalog_path, dir).unwrap()
}

fn settings(dir: &Path) -> ManagerSettings {
    ManagerSettings {
        tools_dir: dir.to_path_buf(),
        timeouts: Timeouts {
            install_secs: 20,
            command_secs: 20,
            execution_secs: 20,
            oracle_secs: 5,
            strategy_secs: 5,
        },
        base_prerequisites: vec![],
        runtime_prerequisite: None,
    }
}

fn open_manager(dir: &Path, catalog: ToolCatalog, oracle: Arc<dyn VersionOracle>) -> ToolManager {
    ToolManager::new(
        Arc::new(catalog),
        StateStore::new(dir.join("tool_state.json")),
        oracle,
        settings(dir),
    )
}

fn offline_oracle() -> Arc<dyn VersionOracle> {
    Arc::new(GithubOracle::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap())
}

#[tokio::test]
async fn install_exit_zero_without_artifact_is_failure() {
    let temp = TempDir::new().unwrap();
    let catalog = write_catalog(
        temp.path(),
        vec![entry("alpha", "Directory", commands("exit 0", None, "true", None))],
    );
    let manager = open_manager(temp.path(), catalog, offline_oracle());

    let err = manager.install("alpha").await.unwrap_err();
    assert!(matches!(err, AppError::NotAvailableAfterInstall { .. }));
    assert!(!manager.state("alpha").await.unwrap().installed);
    assert!(!temp.path().join("alpha").exists());
}

#[tokio::test]
async fn install_is_idempotent_and_survives_restart() {
    let temp = TempDir::new().unwrap();
    let counter = temp.path().join("runs");
    let install = format!(
        r#"echo x >> "{}" && mkdir -p "{{path}}" && echo ok > "{{path}}/main.py""#,
        counter.display()
    );
    let catalog = write_catalog(
        temp.path(),
        vec![entry(
            "beta",
            "GitClone",
            commands(&install, None, "true", Some("echo beta v3.1.4")),
        )],
    );
    let manager = open_manager(temp.path(), catalog.clone(), offline_oracle());

    let first = manager.install("beta").await.unwrap();
    let second = manager.install("beta").await.unwrap();
    assert_eq!(first, InstallOutcome::Installed { version: "3.1.4".to_string() });
    assert!(matches!(second, InstallOutcome::AlreadyInstalled { .. }));
    assert_eq!(std::fs::read_to_string(&counter).unwrap().lines().count(), 1);

    let before = manager.snapshot().await;
    drop(manager);

    let reopened = open_manager(temp.path(), catalog, offline_oracle());
    let after = reopened.snapshot().await;
    assert_eq!(before["beta"].installed, after["beta"].installed);
    assert_eq!(before["beta"].local_version, after["beta"].local_version);
    assert_eq!(before["beta"].last_updated, after["beta"].last_updated);
}

#[tokio::test]
async fn update_on_missing_tool_installs_instead() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("update-ran");
    let update = format!(r#"touch "{}""#, marker.display());
    let catalog = write_catalog(
        temp.path(),
        vec![entry(
            "gamma",
            "Directory",
            commands(r#"mkdir -p "{path}""#, None, &update, Some("echo 0.9.0")),
        )],
    );
    let manager = open_manager(temp.path(), catalog, offline_oracle());

    let outcome = manager.update("gamma").await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::Installed(InstallOutcome::Installed { .. })));
    assert!(!marker.exists());
    assert!(manager.state("gamma").await.unwrap().installed);
}

#[tokio::test]
async fn check_all_reports_newer_remote_version() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/delta/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "2.0.0",
            "html_url": "https://example.test/acme/delta/releases/2.0.0",
            "body": "notes"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/epsilon/releases/latest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = write_catalog(
        temp.path(),
        vec![
            entry(
                "delta",
                "Directory",
                commands(r#"mkdir -p "{path}""#, None, "true", Some("echo 1.0.0")),
            ),
            entry("epsilon", "Directory", commands("true", None, "true", None)),
        ],
    );
    let oracle: Arc<dyn VersionOracle> =
        Arc::new(GithubOracle::new(&server.uri(), None, Duration::from_secs(5)).unwrap());
    let manager = open_manager(temp.path(), catalog, oracle);
    manager.install("delta").await.unwrap();
    let state_before = std::fs::read_to_string(temp.path().join("tool_state.json")).unwrap();

    let updates = manager.check_all().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].key, "delta");
    assert_eq!(updates[0].current, "1.0.0");
    assert_eq!(updates[0].latest, "2.0.0");

    let state_after = std::fs::read_to_string(temp.path().join("tool_state.json")).unwrap();
    assert_eq!(state_before, state_after);
}

#[tokio::test]
async fn unknown_key_has_no_side_effects() {
    let temp = TempDir::new().unwrap();
    let catalog = write_catalog(
        temp.path(),
        vec![entry("zeta", "Directory", commands("true", None, "true", None))],
    );
    let manager = open_manager(temp.path(), catalog, offline_oracle());

    assert!(manager.install("nope").await.unwrap_err().is_config_error());
    assert!(manager.update("nope").await.unwrap_err().is_config_error());
    assert_eq!(manager.execute("nope", "http://t", None).await.error, "Unknown tool: nope");
    assert!(!temp.path().join("tool_state.json").exists());
}

#[test]
fn catalog_rejects_target_outside_run_template() {
    let temp = TempDir::new().unwrap();
    let catalog_path = temp.path().join("catalog.json");
    let bad = entry("eta", "Directory", commands("install {target}", None, "true", None));
    std::fs::write(&catalog_path, serde_json::to_string(&vec![bad]).unwrap()).unwrap();

    let err = ToolCatalog::load_json(&catalog_path, temp.path()).unwrap_err();
    assert!(err.is_config_error());
}
