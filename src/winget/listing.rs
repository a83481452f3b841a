//! 分隔行之后逐行列出的简单输出：可安装版本、软件源列表

use super::columns::is_separator;
use super::types::SourceEntry;
use url::Url;

/// `winget show --versions`：分隔行之后每个非空行是一个版本号
pub fn parse_versions<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut dashes_passed = false;
    let mut versions = Vec::new();
    for line in lines {
        if !dashes_passed {
            dashes_passed = is_separator(&line);
            continue;
        }
        let version = line.trim();
        if !version.is_empty() {
            versions.push(version.to_string());
        }
    }
    versions
}

/// `winget source list`：分隔行之后每行为 `名称  地址  ...`
pub fn parse_source_list<I>(lines: I) -> Vec<SourceEntry>
where
    I: IntoIterator<Item = String>,
{
    let mut dashes_passed = false;
    let mut sources = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if !dashes_passed {
            dashes_passed = is_separator(&line);
            continue;
        }
        match parse_source_line(&line) {
            Some(entry) => sources.push(entry),
            None => log::warn!("无法解析软件源行: {:?}", line),
        }
    }
    sources
}

fn parse_source_line(line: &str) -> Option<SourceEntry> {
    // 名称与地址都不含空格
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let url = Url::parse(parts.next()?).ok()?;
    Some(SourceEntry {
        name: name.to_string(),
        url,
    })
}
