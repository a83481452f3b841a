//! 包列表收集器：结构化输出优先，必要时降级到表格输出

use super::fallback::{non_empty, FallbackChain};
use super::streaming::LineStream;
use super::structured;
use super::table::TableParser;
use super::types::{Operation, RawPackageRecord};
use crate::config::Config;
use crate::error::Result;
use crate::transcript;
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait Collector {
    fn collect(&self, operation: &Operation) -> Result<Vec<RawPackageRecord>>;
}

/// 旧版 winget 命令行参数
pub fn legacy_args(operation: &Operation) -> Vec<String> {
    let args: Vec<&str> = match operation {
        Operation::Search { query } => {
            return vec![
                "search".to_string(),
                query.clone(),
                "--accept-source-agreements".to_string(),
            ]
        }
        Operation::ListInstalled => vec!["list", "--accept-source-agreements"],
        Operation::ListUpdates => vec!["update", "--include-unknown", "--accept-source-agreements"],
    };
    args.into_iter().map(str::to_string).collect()
}

/// 解析 `winget search` / `list` / `update` 的表格输出
pub struct LegacyCollector<'a> {
    config: &'a Config,
}

impl<'a> LegacyCollector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl Collector for LegacyCollector<'_> {
    fn collect(&self, operation: &Operation) -> Result<Vec<RawPackageRecord>> {
        let mut transcript = transcript::open(
            self.config.transcript_dir.as_deref(),
            &format!("{}-legacy", operation.task_name()),
        );
        let stream = LineStream::spawn(
            &self.config.winget_path,
            &legacy_args(operation),
            None,
            transcript.as_mut(),
        )?;

        let mut parser = TableParser::new(stream, operation.shape());
        let records: Vec<RawPackageRecord> = parser.by_ref().collect();
        parser.into_inner().finish_checked()?;

        log::info!("{}: 表格输出解析到 {} 个包", operation.task_name(), records.len());
        Ok(records)
    }
}

/// 通过 PowerShell 模块获取结构化输出
pub struct StructuredCollector<'a> {
    config: &'a Config,
}

impl<'a> StructuredCollector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl Collector for StructuredCollector<'_> {
    fn collect(&self, operation: &Operation) -> Result<Vec<RawPackageRecord>> {
        let mut transcript = transcript::open(
            self.config.transcript_dir.as_deref(),
            &format!("{}-structured", operation.task_name()),
        );
        let script = structured::script(operation);
        let mut stream = LineStream::spawn(
            &self.config.powershell_path,
            &self.config.powershell_args,
            Some(&script),
            transcript.as_mut(),
        )?;

        let shape = operation.shape();
        let records: Vec<RawPackageRecord> = stream
            .by_ref()
            .filter_map(|line| structured::parse_line(shape, &line))
            .collect();
        stream.finish_checked()?;

        log::info!("{}: 结构化输出解析到 {} 个包", operation.task_name(), records.len());
        Ok(records)
    }
}

/// 先尝试结构化收集器；它出错或没有结果时改用表格收集器
pub struct FallbackCollector<S, L> {
    structured: S,
    legacy: L,
    force_legacy: bool,
    downgrades: AtomicUsize,
}

impl<S, L> FallbackCollector<S, L>
where
    S: Collector,
    L: Collector,
{
    pub fn new(structured: S, legacy: L, force_legacy: bool) -> Self {
        Self {
            structured,
            legacy,
            force_legacy,
            downgrades: AtomicUsize::new(0),
        }
    }

    /// 已发生的降级次数
    pub fn downgrades(&self) -> usize {
        self.downgrades.load(Ordering::Relaxed)
    }
}

impl<S, L> Collector for FallbackCollector<S, L>
where
    S: Collector,
    L: Collector,
{
    fn collect(&self, operation: &Operation) -> Result<Vec<RawPackageRecord>> {
        if self.force_legacy {
            log::debug!("{}: 已强制使用表格输出", operation.task_name());
            return self.legacy.collect(operation);
        }

        FallbackChain::new(operation.task_name())
            .attempt("structured", || {
                self.structured.collect(operation).map(non_empty)
            })
            .on_downgrade(|_, _| {
                self.downgrades.fetch_add(1, Ordering::Relaxed);
            })
            .finally("legacy", || self.legacy.collect(operation))
    }
}
