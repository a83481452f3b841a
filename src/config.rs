use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 强制使用旧版（表格）解析路径的环境变量
pub const FORCE_LEGACY_ENV: &str = "WINGET_BRIDGE_FORCE_LEGACY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub winget_path: String,
    pub powershell_path: String,
    pub powershell_args: Vec<String>,
    /// 跳过 PowerShell 模块，直接解析 winget 表格输出
    pub force_legacy: bool,
    /// 详情查询使用的语言；未设置时从 LANG / LC_ALL 推断
    pub locale: Option<String>,
    pub fallback_locale: String,
    pub default_source: String,
    pub known_sources: Vec<String>,
    /// 设置后每次调用都会保存一份输入输出记录
    pub transcript_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            winget_path: "winget".to_string(),
            powershell_path: "powershell.exe".to_string(),
            powershell_args: ["-NoProfile", "-NonInteractive", "-Command", "-"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            force_legacy: false,
            locale: None,
            fallback_locale: "en-US".to_string(),
            default_source: "winget".to_string(),
            known_sources: vec!["winget".to_string(), "msstore".to_string()],
            transcript_dir: None,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        let config_path = PathBuf::from(home).join(".config/winget-bridge/config.toml");

        let mut config = if config_path.exists() {
            Self::load(&config_path)?
        } else {
            Self::default()
        };
        if env_flag(FORCE_LEGACY_ENV) {
            config.force_legacy = true;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 当前语言，形如 `zh-CN`
    pub fn current_locale(&self) -> Option<String> {
        if let Some(locale) = &self.locale {
            return Some(locale.clone());
        }
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|value| normalize_locale(&value))
    }
}

/// `zh_CN.UTF-8` → `zh-CN`；`C` / `POSIX` 视为未设置
pub fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or("").trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_posix_locales() {
        assert_eq!(normalize_locale("zh_CN.UTF-8").as_deref(), Some("zh-CN"));
        assert_eq!(normalize_locale("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(normalize_locale("en-US").as_deref(), Some("en-US"));
        assert_eq!(normalize_locale("C"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("force_legacy = true\nlocale = \"fr-FR\"").unwrap();
        assert!(config.force_legacy);
        assert_eq!(config.current_locale().as_deref(), Some("fr-FR"));
        assert_eq!(config.fallback_locale, "en-US");
        assert_eq!(config.default_source, "winget");
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "force_legacy = \"maybe\"").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::ConfigParse { .. })));
    }
}
