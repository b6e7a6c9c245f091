//! 工具目录
//!
//! 内置九个安全工具；也可以通过 JSON 文件整体替换。目录中的模板在构建时校验，
//! 之后的生命周期操作不会再遇到非法模板。

use crate::core::error::{AppError, AppResult};
use crate::data::{DataError, JsonManager};
use crate::models::{
    AppConfig, CommandKind, CommandTemplate, CommandTemplates, InstallMethod, PlatformCommands,
    ToolCategory, ToolDescriptor,
};
use std::path::Path;

/// 工具目录（保持定义顺序）
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// 根据配置构建目录（优先使用 `catalog_path`）
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        match &config.catalog_path {
            Some(path) => Self::load_json(path, &config.tools_dir),
            None => Self::builtin(&config.tools_dir, &config.python_command),
        }
    }

    /// 校验并构建目录（key 唯一、模板合法）
    pub fn from_descriptors(tools: Vec<ToolDescriptor>) -> AppResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for tool in &tools {
            if tool.key.trim().is_empty() {
                return Err(AppError::Config {
                    reason: format!("工具 {} 的 key 为空", tool.name),
                });
            }
            if !seen.insert(tool.key.as_str()) {
                return Err(AppError::Config {
                    reason: format!("工具 key 重复: {}", tool.key),
                });
            }
            tool.validate()?;
        }
        Ok(Self { tools })
    }

    /// 从 JSON 文件加载（数组形式；相对安装路径基于工具目录）
    pub fn load_json(path: &Path, tools_dir: &Path) -> AppResult<Self> {
        let mut tools: Vec<ToolDescriptor> =
            JsonManager::new().read_as(path).map_err(|e| match e {
                DataError::Io { source, .. } => AppError::Config {
                    reason: format!("无法读取工具目录文件 {}: {source}", path.display()),
                },
                DataError::JsonSerialization(inner) => AppError::Config {
                    reason: format!("工具目录文件格式错误 {}: {inner}", path.display()),
                },
                other => other.into(),
            })?;

        for tool in &mut tools {
            if tool.install_path.is_relative() {
                tool.install_path = tools_dir.join(&tool.install_path);
            }
        }

        tracing::info!(path = %path.display(), count = tools.len(), "已加载自定义工具目录");
        Self::from_descriptors(tools)
    }

    /// 内置工具目录
    pub fn builtin(tools_dir: &Path, python: &str) -> AppResult<Self> {
        let tools = builtin_entries(python)
            .into_iter()
            .map(|entry| entry.into_descriptor(tools_dir))
            .collect::<AppResult<Vec<_>>>()?;
        Self::from_descriptors(tools)
    }

    pub fn get(&self, key: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.key == key)
    }

    /// 查找工具，不存在时返回 `UnknownTool`（附带可用 key 列表）
    pub fn require(&self, key: &str) -> AppResult<&ToolDescriptor> {
        self.get(key).ok_or_else(|| AppError::UnknownTool {
            key: key.to_string(),
            available: self.keys().map(str::to_string).collect(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// 一套平台命令的原始字符串：install / run / update / version（空串表示无）
type RawCommands = [String; 4];

struct BuiltinEntry {
    key: &'static str,
    name: &'static str,
    repo: &'static str,
    category: ToolCategory,
    description: &'static str,
    dir: &'static str,
    method: InstallMethod,
    requires_runtime: bool,
    posix: RawCommands,
    windows: RawCommands,
}

impl BuiltinEntry {
    fn into_descriptor(self, tools_dir: &Path) -> AppResult<ToolDescriptor> {
        Ok(ToolDescriptor {
            key: self.key.to_string(),
            name: self.name.to_string(),
            repo: self.repo.to_string(),
            category: self.category,
            description: self.description.to_string(),
            templates: CommandTemplates {
                posix: platform_commands(&self.posix)?,
                windows: platform_commands(&self.windows)?,
            },
            install_path: tools_dir.join(self.dir),
            install_method: self.method,
            required_files: required_files(self.key),
            command_aliases: command_aliases(self.key),
            requires_runtime: self.requires_runtime,
        })
    }
}

fn platform_commands(raw: &RawCommands) -> AppResult<PlatformCommands> {
    let optional = |kind: CommandKind, text: &str| -> AppResult<Option<CommandTemplate>> {
        if text.is_empty() {
            Ok(None)
        } else {
            CommandTemplate::parse_for(kind, text).map(Some)
        }
    };

    Ok(PlatformCommands {
        install: CommandTemplate::parse_for(CommandKind::Install, &raw[0])?,
        run: optional(CommandKind::Run, &raw[1])?,
        update: CommandTemplate::parse_for(CommandKind::Update, &raw[2])?,
        version: optional(CommandKind::Version, &raw[3])?,
    })
}

fn required_files(key: &str) -> Vec<String> {
    let files: &[&str] = match key {
        "sqlmap" => &["sqlmap.py"],
        "xsstrike" => &["xsstrike.py"],
        "dirsearch" => &["dirsearch.py"],
        "paramspider" => &["paramspider/main.py"],
        "nmap-vulners" => &["vulners.nse"],
        _ => &[],
    };
    files.iter().map(|f| f.to_string()).collect()
}

fn command_aliases(key: &str) -> Vec<String> {
    match key {
        "dirsearch" | "paramspider" | "nuclei" | "httpx" | "subfinder" => vec![key.to_string()],
        _ => Vec::new(),
    }
}

fn cmds(install: &str, run: &str, update: &str, version: &str) -> RawCommands {
    [
        install.to_string(),
        run.to_string(),
        update.to_string(),
        version.to_string(),
    ]
}

fn builtin_entries(py: &str) -> Vec<BuiltinEntry> {
    const GIT_PULL: &str = r#"cd "{path}" && git pull"#;
    const GIT_PULL_WIN: &str = r#"cd /d "{path}" && git pull"#;
    const GIT_HEAD: &str = r#"cd "{path}" && git rev-parse --short HEAD"#;
    const GIT_HEAD_WIN: &str = r#"cd /d "{path}" && git rev-parse --short HEAD"#;

    let clone = |url: &str| format!(r#"git clone --depth 1 {url} "{{path}}""#);

    vec![
        BuiltinEntry {
            key: "sqlmap",
            name: "SQLMap",
            repo: "sqlmapproject/sqlmap",
            category: ToolCategory::InjectionTester,
            description: "Automatic SQL Injection detection and exploitation tool",
            dir: "sqlmap",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                &clone("https://github.com/sqlmapproject/sqlmap.git"),
                &format!(r#"{py} "{{path}}/sqlmap.py" -u "{{target}}" --batch"#),
                GIT_PULL,
                &format!(r#"{py} "{{path}}/sqlmap.py" --version"#),
            ),
            windows: cmds(
                &clone("https://github.com/sqlmapproject/sqlmap.git"),
                &format!(r#"{py} "{{path}}\sqlmap.py" -u "{{target}}" --batch"#),
                GIT_PULL_WIN,
                &format!(r#"{py} "{{path}}\sqlmap.py" --version"#),
            ),
        },
        BuiltinEntry {
            key: "xsstrike",
            name: "XSStrike",
            repo: "s0md3v/XSStrike",
            category: ToolCategory::XssDetector,
            description: "Advanced XSS detection tool (run via python xsstrike.py)",
            dir: "XSStrike",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                &clone("https://github.com/s0md3v/XSStrike.git"),
                &format!(r#"{py} "{{path}}/xsstrike.py" -u "{{target}}""#),
                GIT_PULL,
                &format!(r#"{py} "{{path}}/xsstrike.py" -h"#),
            ),
            windows: cmds(
                &clone("https://github.com/s0md3v/XSStrike.git"),
                &format!(r#"{py} "{{path}}\xsstrike.py" -u "{{target}}""#),
                GIT_PULL_WIN,
                &format!(r#"{py} "{{path}}\xsstrike.py" -h"#),
            ),
        },
        BuiltinEntry {
            key: "dirsearch",
            name: "Dirsearch",
            repo: "maurosoria/dirsearch",
            category: ToolCategory::Recon,
            description: "Web path bruteforce tool",
            dir: "dirsearch",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                &format!(
                    r#"{} && pip install -r "{{path}}/requirements.txt""#,
                    clone("https://github.com/maurosoria/dirsearch.git")
                ),
                &format!(r#"{py} "{{path}}/dirsearch.py" -u "{{target}}""#),
                GIT_PULL,
                &format!(r#"{py} "{{path}}/dirsearch.py" --version"#),
            ),
            windows: cmds(
                &format!(
                    r#"{} && pip install -r "{{path}}\requirements.txt""#,
                    clone("https://github.com/maurosoria/dirsearch.git")
                ),
                &format!(r#"{py} "{{path}}\dirsearch.py" -u "{{target}}""#),
                GIT_PULL_WIN,
                &format!(r#"{py} "{{path}}\dirsearch.py" --version"#),
            ),
        },
        BuiltinEntry {
            key: "paramspider",
            name: "ParamSpider",
            repo: "devanshbatham/ParamSpider",
            category: ToolCategory::Recon,
            description: "Mining URLs from web archives for parameter discovery",
            dir: "ParamSpider",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                &format!(
                    r#"{} && PYTHONUTF8=1 {py} -m pip install "{{path}}""#,
                    clone("https://github.com/devanshbatham/ParamSpider.git")
                ),
                &format!(r#"{py} -m paramspider.main -d "{{target}}""#),
                &format!(
                    r#"cd "{{path}}" && git pull && PYTHONUTF8=1 {py} -m pip install --upgrade "{{path}}""#
                ),
                GIT_HEAD,
            ),
            windows: cmds(
                &format!(
                    r#"{} && set PYTHONUTF8=1&& {py} -m pip install "{{path}}""#,
                    clone("https://github.com/devanshbatham/ParamSpider.git")
                ),
                &format!(r#"{py} -m paramspider.main -d "{{target}}""#),
                &format!(
                    r#"cd /d "{{path}}" && git pull && set PYTHONUTF8=1&& {py} -m pip install --upgrade "{{path}}""#
                ),
                GIT_HEAD_WIN,
            ),
        },
        BuiltinEntry {
            key: "nuclei-templates",
            name: "Nuclei Templates",
            repo: "projectdiscovery/nuclei-templates",
            category: ToolCategory::Scanner,
            description: "Nuclei vulnerability templates (CVE, misconfigs, etc.)",
            dir: "nuclei-templates",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                r#"git clone https://github.com/projectdiscovery/nuclei-templates.git "{path}""#,
                "",
                GIT_PULL,
                GIT_HEAD,
            ),
            windows: cmds(
                r#"git clone https://github.com/projectdiscovery/nuclei-templates.git "{path}""#,
                "",
                GIT_PULL_WIN,
                GIT_HEAD_WIN,
            ),
        },
        BuiltinEntry {
            key: "nuclei",
            name: "Nuclei",
            repo: "projectdiscovery/nuclei",
            category: ToolCategory::Scanner,
            description: "Fast and customizable vulnerability scanner (Go required)",
            dir: "nuclei",
            method: InstallMethod::Package,
            requires_runtime: true,
            posix: cmds(
                "go install -v github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
                r#"nuclei -u "{target}""#,
                "nuclei -ut",
                "nuclei -version",
            ),
            windows: cmds(
                "go install -v github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
                "nuclei -u {target}",
                "nuclei -ut",
                "nuclei -version",
            ),
        },
        BuiltinEntry {
            key: "httpx",
            name: "httpx",
            repo: "projectdiscovery/httpx",
            category: ToolCategory::Recon,
            description: "Fast HTTP probe tool (Go required)",
            dir: "httpx",
            method: InstallMethod::Package,
            requires_runtime: true,
            posix: cmds(
                "go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest",
                r#"echo "{target}" | httpx -tech-detect"#,
                "go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest",
                "httpx -version",
            ),
            windows: cmds(
                "go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest",
                "httpx -u {target} -tech-detect -silent",
                "go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest",
                "httpx -version",
            ),
        },
        BuiltinEntry {
            key: "subfinder",
            name: "Subfinder",
            repo: "projectdiscovery/subfinder",
            category: ToolCategory::Recon,
            description: "Fast subdomain discovery tool (Go required)",
            dir: "subfinder",
            method: InstallMethod::Package,
            requires_runtime: true,
            posix: cmds(
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
                r#"subfinder -d "{target}""#,
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
                "subfinder -version",
            ),
            windows: cmds(
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
                "subfinder -d {target}",
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
                "subfinder -version",
            ),
        },
        BuiltinEntry {
            key: "nmap-vulners",
            name: "Nmap Vulners",
            repo: "vulnersCom/nmap-vulners",
            category: ToolCategory::NetworkScan,
            description: "Nmap vulnerability detection scripts (Nmap required)",
            dir: "nmap-vulners",
            method: InstallMethod::GitClone,
            requires_runtime: false,
            posix: cmds(
                r#"git clone https://github.com/vulnersCom/nmap-vulners.git "{path}""#,
                r#"nmap -sV --script="{path}/vulners.nse" "{target}""#,
                GIT_PULL,
                GIT_HEAD,
            ),
            windows: cmds(
                r#"git clone https://github.com/vulnersCom/nmap-vulners.git "{path}""#,
                r#"nmap -sV --script="{path}\vulners.nse" {target}"#,
                GIT_PULL_WIN,
                GIT_HEAD_WIN,
            ),
        },
    ]
}
