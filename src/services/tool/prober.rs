use crate::models::{InstallMethod, ToolDescriptor};
use crate::utils::CommandExecutor;
use std::path::Path;

/// 本地可用性探测
///
/// 只检查文件系统和 PATH，不执行任何命令。
#[derive(Debug, Clone, Default)]
pub struct AvailabilityProber {
    executor: CommandExecutor,
}

impl AvailabilityProber {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    pub fn is_available(&self, tool: &ToolDescriptor) -> bool {
        let available = match tool.install_method {
            InstallMethod::GitClone => self.clone_is_complete(tool),
            _ if tool.requires_runtime => self.on_path(tool),
            InstallMethod::Package => self.on_path(tool),
            InstallMethod::Directory => tool.install_path.exists(),
        };

        tracing::trace!(tool = %tool.key, available, "可用性探测");
        available
    }

    fn clone_is_complete(&self, tool: &ToolDescriptor) -> bool {
        if !tool.install_path.exists() {
            return false;
        }
        if tool.required_files.is_empty() {
            return dir_has_content(&tool.install_path);
        }
        tool.required_files
            .iter()
            .all(|rel| tool.install_path.join(rel).exists())
    }

    fn on_path(&self, tool: &ToolDescriptor) -> bool {
        tool.candidate_commands()
            .iter()
            .any(|cmd| self.executor.command_exists(cmd))
    }
}

fn dir_has_content(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommandTemplate, CommandTemplates, PlatformCommands, ToolCategory};
    use tempfile::TempDir;

    fn descriptor(method: InstallMethod, path: &Path, required: Vec<&str>) -> ToolDescriptor {
        let commands = PlatformCommands {
            install: CommandTemplate::parse("true").unwrap(),
            run: None,
            update: CommandTemplate::parse("true").unwrap(),
            version: None,
        };
        ToolDescriptor {
            key: "probe-test".to_string(),
            name: "Probe Test".to_string(),
            repo: "example/probe".to_string(),
            category: ToolCategory::Recon,
            description: String::new(),
            templates: CommandTemplates {
                posix: commands.clone(),
                windows: commands,
            },
            install_path: path.to_path_buf(),
            install_method: method,
            required_files: required.into_iter().map(String::from).collect(),
            command_aliases: vec![],
            requires_runtime: false,
        }
    }

    #[test]
    fn test_git_clone_requires_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sqlmap");
        let prober = AvailabilityProber::default();
        let tool = descriptor(InstallMethod::GitClone, &path, vec!["sqlmap.py"]);

        assert!(!prober.is_available(&tool));

        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("README.md"), "x").unwrap();
        assert!(!prober.is_available(&tool));

        std::fs::write(path.join("sqlmap.py"), "").unwrap();
        assert!(prober.is_available(&tool));
    }

    #[test]
    fn test_git_clone_without_required_files_needs_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates");
        std::fs::create_dir_all(&path).unwrap();
        let prober = AvailabilityProber::default();
        let tool = descriptor(InstallMethod::GitClone, &path, vec![]);

        assert!(!prober.is_available(&tool));
        std::fs::write(path.join("cves.yaml"), "").unwrap();
        assert!(prober.is_available(&tool));
    }

    #[test]
    fn test_directory_method() {
        let temp = TempDir::new().unwrap();
        let prober = AvailabilityProber::default();
        let tool = descriptor(InstallMethod::Directory, &temp.path().join("x"), vec![]);

        assert!(!prober.is_available(&tool));
        std::fs::create_dir_all(temp.path().join("x")).unwrap();
        assert!(prober.is_available(&tool));
    }

    #[cfg(unix)]
    #[test]
    fn test_package_method_uses_path() {
        let temp = TempDir::new().unwrap();
        let prober = AvailabilityProber::default();
        let mut tool = descriptor(InstallMethod::Package, &temp.path().join("x"), vec![]);

        tool.command_aliases = vec!["definitely-missing-tool-9000".to_string()];
        assert!(!prober.is_available(&tool));

        tool.command_aliases = vec!["sh".to_string()];
        assert!(prober.is_available(&tool));
    }
}
