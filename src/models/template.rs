//! 命令模板
//!
//! 模板字符串只允许两个占位符：`{path}`（安装路径）和 `{target}`（扫描目标）。
//! 模板在目录构建或反序列化时即被解析为类型化片段，非法模板不会进入运行期。

use crate::core::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 模板占位符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    InstallPath,
    Target,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "path" => Some(Placeholder::InstallPath),
            "target" => Some(Placeholder::Target),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Placeholder::InstallPath => "path",
            Placeholder::Target => "target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// 命令种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Install,
    Run,
    Update,
    Version,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Install => "install",
            CommandKind::Run => "run",
            CommandKind::Update => "update",
            CommandKind::Version => "version",
        }
    }

    /// 只有 run 命令可以引用扫描目标
    pub fn allows_target(&self) -> bool {
        matches!(self, CommandKind::Run)
    }
}

/// 渲染上下文
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub install_path: &'a Path,
    pub target: Option<&'a str>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(install_path: &'a Path) -> Self {
        Self {
            install_path,
            target: None,
        }
    }

    pub fn with_target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }
}

/// 已解析的命令模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    /// 解析模板字符串
    pub fn parse(raw: &str) -> AppResult<Self> {
        let invalid = |reason: String| AppError::InvalidTemplate {
            template: raw.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid("占位符中出现嵌套的 '{'".to_string())),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid("缺少闭合的 '}'".to_string()));
                    }
                    let placeholder = Placeholder::parse(&name)
                        .ok_or_else(|| invalid(format!("未知占位符 {{{name}}}")))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                }
                '}' => return Err(invalid("多余的 '}'".to_string())),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// 解析并校验占位符是否适用于该命令种类
    pub fn parse_for(kind: CommandKind, raw: &str) -> AppResult<Self> {
        let template = Self::parse(raw)?;
        template.check_kind(kind)?;
        Ok(template)
    }

    pub fn check_kind(&self, kind: CommandKind) -> AppResult<()> {
        if self.uses_target() && !kind.allows_target() {
            return Err(AppError::InvalidTemplate {
                template: self.raw.clone(),
                reason: format!("{} 命令不能引用 {{target}}", kind.as_str()),
            });
        }
        Ok(())
    }

    pub fn uses_target(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Slot(Placeholder::Target)))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 代入占位符生成命令字符串（未提供目标时 `{target}` 渲染为空）
    pub fn render(&self, ctx: &TemplateContext<'_>) -> String {
        let mut out = String::with_capacity(self.raw.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Placeholder::InstallPath) => {
                    out.push_str(&ctx.install_path.to_string_lossy())
                }
                Segment::Slot(Placeholder::Target) => out.push_str(ctx.target.unwrap_or_default()),
            }
        }
        out
    }

    /// 模板中引用到的占位符名称（用于诊断输出）
    pub fn placeholders(&self) -> Vec<&'static str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot(p) => Some(p.name()),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}

impl TryFrom<String> for CommandTemplate {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommandTemplate> for String {
    fn from(template: CommandTemplate) -> Self {
        template.raw
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_path_and_target() {
        let template =
            CommandTemplate::parse(r#"python3 "{path}/sqlmap.py" -u "{target}" --batch"#).unwrap();
        let path = PathBuf::from("/opt/tools/sqlmap");
        let ctx = TemplateContext::new(&path).with_target("http://t/?id=1");

        assert_eq!(
            template.render(&ctx),
            r#"python3 "/opt/tools/sqlmap/sqlmap.py" -u "http://t/?id=1" --batch"#
        );
        assert!(template.uses_target());
        assert_eq!(template.placeholders(), vec!["path", "target"]);
    }

    #[test]
    fn test_target_renders_empty_without_value() {
        let template = CommandTemplate::parse("nuclei -u {target}").unwrap();
        let path = PathBuf::from("/x");
        assert_eq!(template.render(&TemplateContext::new(&path)), "nuclei -u ");
    }

    #[test]
    fn test_rejects_unknown_placeholder() {
        let err = CommandTemplate::parse("run {host}").unwrap_err();
        assert!(matches!(err, AppError::InvalidTemplate { .. }));
        assert!(err.to_string().contains("{host}"));
    }

    #[test]
    fn test_rejects_unbalanced_braces() {
        assert!(CommandTemplate::parse("run {path").is_err());
        assert!(CommandTemplate::parse("run path}").is_err());
        assert!(CommandTemplate::parse("run {{path}}").is_err());
    }

    #[test]
    fn test_target_only_allowed_in_run() {
        assert!(CommandTemplate::parse_for(CommandKind::Run, "x {target}").is_ok());
        let err = CommandTemplate::parse_for(CommandKind::Install, "x {target}").unwrap_err();
        assert!(err.is_config_error());
        assert!(CommandTemplate::parse_for(CommandKind::Version, "x --version").is_ok());
    }

    #[test]
    fn test_serde_validates_on_load() {
        let ok: CommandTemplate = serde_json::from_str(r#""cd \"{path}\" && git pull""#).unwrap();
        assert_eq!(ok.as_str(), r#"cd "{path}" && git pull"#);
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#""cd \"{path}\" && git pull""#);

        let bad = serde_json::from_str::<CommandTemplate>(r#""run {bogus}""#);
        assert!(bad.is_err());
    }
}
