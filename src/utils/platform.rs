use std::ffi::OsString;
use std::path::PathBuf;

/// 平台信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub is_windows: bool,
    pub is_macos: bool,
    pub is_linux: bool,
}

impl PlatformInfo {
    pub fn current() -> Self {
        PlatformInfo {
            is_windows: cfg!(target_os = "windows"),
            is_macos: cfg!(target_os = "macos"),
            is_linux: cfg!(target_os = "linux"),
        }
    }

    pub fn os_name(&self) -> &'static str {
        if self.is_windows {
            "Windows"
        } else if self.is_macos {
            "macOS"
        } else if self.is_linux {
            "Linux"
        } else {
            "Unix"
        }
    }

    /// 执行 shell 命令字符串所用的解释器和参数
    pub fn shell(&self) -> (&'static str, &'static str) {
        if self.is_windows {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        }
    }

    /// 常见的用户级安装目录（go install / pip --user / cargo install）
    pub fn user_bin_dirs(&self) -> Vec<PathBuf> {
        let mut dirs_list = Vec::new();
        if let Some(home) = dirs::home_dir() {
            dirs_list.push(home.join("go").join("bin"));
            dirs_list.push(home.join(".cargo").join("bin"));
            if !self.is_windows {
                dirs_list.push(home.join(".local").join("bin"));
            }
        }
        if self.is_windows {
            dirs_list.push(PathBuf::from(r"C:\Program Files\Go\bin"));
        } else {
            dirs_list.push(PathBuf::from("/usr/local/go/bin"));
        }
        dirs_list
    }

    /// 构建增强的 PATH：当前进程 PATH + 用户级安装目录（去重）
    pub fn build_enhanced_path(&self) -> OsString {
        let mut paths: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();

        for dir in self.user_bin_dirs() {
            if !paths.contains(&dir) {
                paths.push(dir);
            }
        }

        std::env::join_paths(paths).unwrap_or_else(|_| std::env::var_os("PATH").unwrap_or_default())
    }
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self::current()
    }
}
