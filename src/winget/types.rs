//! winget 相关数据类型定义

use serde::Serialize;
use std::fmt;
use url::Url;

/// 一次包列表查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Search { query: String },
    ListInstalled,
    ListUpdates,
}

impl Operation {
    pub fn shape(&self) -> TableShape {
        match self {
            Operation::Search { .. } => TableShape::Search,
            Operation::ListInstalled => TableShape::Installed,
            Operation::ListUpdates => TableShape::Updates,
        }
    }

    /// 用于日志与记录文件名
    pub fn task_name(&self) -> &'static str {
        match self {
            Operation::Search { .. } => "search",
            Operation::ListInstalled => "list-installed",
            Operation::ListUpdates => "list-updates",
        }
    }
}

/// 表格输出的三种记录形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    Search,
    Installed,
    Updates,
}

/// 每一数据行解析出的原始记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPackageRecord {
    pub name: String,
    pub id: String,
    pub installed_version: String,
    pub available_version: Option<String>,
    /// None 表示输出中没有来源列，稍后由默认来源或启发式分类补全
    pub source_name: Option<String>,
}

/// 包来源
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceClassification {
    /// 正式注册的软件源，如 winget / msstore
    Registry(String),
    AndroidSubsystem,
    Steam,
    UbisoftConnect,
    Gog,
    MicrosoftStore,
    LocalPc,
}

impl SourceClassification {
    pub fn name(&self) -> &str {
        match self {
            SourceClassification::Registry(name) => name,
            SourceClassification::AndroidSubsystem => "Android Subsystem",
            SourceClassification::Steam => "Steam",
            SourceClassification::UbisoftConnect => "Ubisoft Connect",
            SourceClassification::Gog => "GOG",
            SourceClassification::MicrosoftStore => "Microsoft Store",
            SourceClassification::LocalPc => "Local PC",
        }
    }

    pub fn is_local(&self) -> bool {
        !matches!(self, SourceClassification::Registry(_))
    }
}

impl fmt::Display for SourceClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 补全来源后的包
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub id: String,
    pub version: String,
    pub new_version: Option<String>,
    pub source: SourceClassification,
}

/// `winget show` 解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageDetails {
    pub publisher: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<Url>,
    pub installer_hash: Option<String>,
    pub installer_url: Option<Url>,
    pub installer_type: Option<String>,
    pub homepage: Option<Url>,
    pub release_date: Option<String>,
    pub release_notes_url: Option<Url>,
    pub manifest_url: Option<Url>,
    /// 多行字段以 `\n` 连接
    pub description: Option<String>,
    pub release_notes: Option<String>,
    pub tags: Vec<String>,
}

/// `winget source list` 中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: Url,
}
