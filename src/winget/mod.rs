//! winget 封装 — 启动 winget / PowerShell 并解析其输出

pub mod classify;
pub mod collect;
pub mod columns;
pub mod details;
pub mod fallback;
pub mod listing;
pub mod registry;
pub mod streaming;
pub mod structured;
pub mod table;
pub mod types;

// 重新导出常用类型和函数
pub use classify::classify;
pub use collect::{Collector, FallbackCollector, LegacyCollector, StructuredCollector};
pub use registry::SourceRegistry;
pub use types::{
    Operation, Package, PackageDetails, RawPackageRecord, SourceClassification, SourceEntry,
    TableShape,
};

use crate::config::Config;
use crate::error::Result;
use crate::transcript;
use fallback::FallbackChain;
use streaming::LineStream;

#[derive(Debug, Clone)]
pub struct WinGet {
    config: Config,
    registry: SourceRegistry,
}

impl WinGet {
    pub fn new(config: Config) -> Self {
        let registry = SourceRegistry::from_config(&config);
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// 收集原始记录：结构化输出优先，空结果或出错时改用表格输出
    pub fn collect(&self, operation: &Operation) -> Result<Vec<RawPackageRecord>> {
        FallbackCollector::new(
            StructuredCollector::new(&self.config),
            LegacyCollector::new(&self.config),
            self.config.force_legacy,
        )
        .collect(operation)
    }

    fn packages(&self, operation: &Operation) -> Result<Vec<Package>> {
        let shape = operation.shape();
        Ok(self
            .collect(operation)?
            .into_iter()
            .map(|record| self.registry.package(record, shape))
            .collect())
    }

    // ===== 查询 =====

    /// 搜索软件源
    pub fn search(&self, query: &str) -> Result<Vec<Package>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.packages(&Operation::Search {
            query: query.trim().to_string(),
        })
    }

    /// 已安装的包（含无正式来源的本地程序）
    pub fn installed_packages(&self) -> Result<Vec<Package>> {
        self.packages(&Operation::ListInstalled)
    }

    /// 有可用更新的包
    pub fn available_updates(&self) -> Result<Vec<Package>> {
        self.packages(&Operation::ListUpdates)
    }

    // ===== 详情 =====

    fn show_args(id: &str, locale: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = [
            "show",
            "--id",
            id,
            "--exact",
            "--disable-interactivity",
            "--accept-source-agreements",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        if let Some(locale) = locale {
            args.push("--locale".to_string());
            args.push(locale.to_string());
        }
        args
    }

    /// 在指定语言下获取详情；该语言不可用时返回 None
    fn show_in_locale(&self, id: &str, locale: &str) -> Result<Option<PackageDetails>> {
        let mut transcript = transcript::open(self.config.transcript_dir.as_deref(), "show");
        let mut stream = LineStream::spawn(
            &self.config.winget_path,
            &Self::show_args(id, Some(locale)),
            None,
            transcript.as_mut(),
        )?;
        match details::parse_until_rejected(stream.by_ref()) {
            Some(details) => {
                stream.finish_checked()?;
                Ok(Some(details))
            }
            None => {
                log::info!("winget 没有 {} 在 {} 下的清单数据", id, locale);
                stream.abandon();
                Ok(None)
            }
        }
    }

    /// 不指定语言，接受 winget 默认输出
    fn show_default(&self, id: &str) -> Result<PackageDetails> {
        let mut transcript = transcript::open(self.config.transcript_dir.as_deref(), "show");
        let mut stream = LineStream::spawn(
            &self.config.winget_path,
            &Self::show_args(id, None),
            None,
            transcript.as_mut(),
        )?;
        let details = details::parse_all(stream.by_ref());
        stream.finish_checked()?;
        Ok(details)
    }

    /// 包详情：依次尝试当前语言、备用语言、winget 默认语言
    pub fn package_details(&self, id: &str, source: &SourceClassification) -> Result<PackageDetails> {
        let locales = locale_attempts(self.config.current_locale(), &self.config.fallback_locale);
        let mut details = details_by_locale(
            &locales,
            |locale| self.show_in_locale(id, locale),
            || self.show_default(id),
        )?;
        details.manifest_url = details::manifest_url(id, source);
        Ok(details)
    }

    /// 可安装的全部版本
    pub fn installable_versions(&self, id: &str) -> Result<Vec<String>> {
        let mut transcript = transcript::open(self.config.transcript_dir.as_deref(), "versions");
        let args: Vec<String> = ["show", "--id", id, "--exact", "--versions", "--accept-source-agreements"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut stream = LineStream::spawn(&self.config.winget_path, &args, None, transcript.as_mut())?;
        let versions = listing::parse_versions(stream.by_ref());
        stream.finish_checked()?;
        Ok(versions)
    }

    /// 已配置的软件源
    pub fn sources(&self) -> Result<Vec<SourceEntry>> {
        let mut transcript = transcript::open(self.config.transcript_dir.as_deref(), "sources");
        let args = vec!["source".to_string(), "list".to_string()];
        let mut stream = LineStream::spawn(&self.config.winget_path, &args, None, transcript.as_mut())?;
        let sources = listing::parse_source_list(stream.by_ref());
        stream.finish_checked()?;
        Ok(sources)
    }
}

/// 显式指定的语言，按尝试顺序；与备用语言相同的当前语言只尝试一次
fn locale_attempts(current: Option<String>, fallback: &str) -> Vec<String> {
    let mut locales: Vec<String> = current.into_iter().collect();
    if !locales.iter().any(|locale| locale == fallback) {
        locales.push(fallback.to_string());
    }
    locales
}

/// 逐个语言尝试，被拒绝的尝试整体丢弃；都不行时接受不带语言参数的结果
fn details_by_locale<L, D>(locales: &[String], in_locale: L, default: D) -> Result<PackageDetails>
where
    L: Fn(&str) -> Result<Option<PackageDetails>>,
    D: FnOnce() -> Result<PackageDetails>,
{
    let in_locale = &in_locale;
    let mut chain = FallbackChain::new("show");
    for locale in locales {
        chain = chain.attempt(format!("locale {}", locale), move || in_locale(locale.as_str()));
    }
    chain.finally("default locale", default)
}
