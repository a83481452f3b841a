//! 旧版表格输出解析（`winget search` / `list` / `update`）

use super::columns::{corrected, is_noise, locate_header, ColumnLayout};
use super::types::{RawPackageRecord, TableShape};

/// 按列偏移切分一行数据。
///
/// 缺少必需列、列顺序错乱或行太短时返回 None，调用方直接跳过该行。
pub fn parse_row(shape: TableShape, layout: &ColumnLayout, row: &str) -> Option<RawPackageRecord> {
    let chars: Vec<char> = row.chars().collect();

    let id_at = layout.id.filter(|&i| i > 0)?;
    let version_at = layout.version.filter(|&v| v > 0)?;
    if !layout.is_ordered() {
        return None;
    }
    // 最后一个必需列必须落在行内
    let last_required = match shape {
        TableShape::Updates => layout.available.filter(|&a| a > 0)?,
        TableShape::Search | TableShape::Installed => version_at,
    };
    if last_required >= chars.len() {
        return None;
    }

    let corrected_id = corrected(&chars, id_at)?;
    let shift = id_at - corrected_id;
    let at = |nominal: usize| nominal - shift;

    let name = slice(&chars, 0, corrected_id)?.trim().to_string();
    let id = first_token(&chars, corrected_id)?;

    let (installed_version, available_version) = match shape {
        TableShape::Search => (first_token(&chars, at(version_at))?, None),
        TableShape::Updates => {
            // last_required 已保证 available 存在
            let available_at = at(layout.available?);
            let version = slice(&chars, at(version_at), available_at)?.trim().to_string();
            let available = match layout.source {
                Some(source_at) => slice(&chars, available_at, at(source_at))?.trim().to_string(),
                None => first_token(&chars, available_at)?,
            };
            (version, Some(available))
        }
        TableShape::Installed => {
            let end = layout
                .available
                .or(layout.source)
                .map(at)
                .unwrap_or(chars.len());
            let version = slice(&chars, at(version_at), end)?.trim().to_string();
            (version, None)
        }
    };

    let source_name = layout
        .source
        .map(at)
        .filter(|&s| s < chars.len())
        .and_then(|s| first_token(&chars, s));

    Some(RawPackageRecord {
        name,
        id,
        installed_version,
        available_version,
        source_name,
    })
}

/// `[start, end)`，`end` 超出行尾时截到行尾；`start > end` 视为无效
fn slice(chars: &[char], start: usize, end: usize) -> Option<String> {
    let end = end.min(chars.len());
    if start > end {
        return None;
    }
    Some(chars[start..end].iter().collect())
}

/// 从 `start` 起的第一个空白分隔词
fn first_token(chars: &[char], start: usize) -> Option<String> {
    let tail = slice(chars, start, chars.len())?;
    tail.split_whitespace().next().map(str::to_string)
}

/// 对一个输出流惰性地产生记录。
///
/// 遇到空行时回到表头扫描状态，以支持分段输出（例如 `winget update`
/// 末尾的"需要显式指定才能升级"的第二张表）。
pub struct TableParser<I> {
    lines: I,
    shape: TableShape,
    layout: Option<ColumnLayout>,
    exhausted: bool,
}

impl<I> TableParser<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I, shape: TableShape) -> Self {
        Self {
            lines,
            shape,
            layout: None,
            exhausted: false,
        }
    }

    /// 取回底层行序列（例如读完后获取进程退出码）
    pub fn into_inner(self) -> I {
        self.lines
    }
}

impl<I> Iterator for TableParser<I>
where
    I: Iterator<Item = String>,
{
    type Item = RawPackageRecord;

    fn next(&mut self) -> Option<RawPackageRecord> {
        if self.exhausted {
            return None;
        }
        loop {
            let layout = match self.layout {
                Some(layout) => layout,
                None => match locate_header(&mut self.lines, self.shape) {
                    Some(layout) => {
                        self.layout = Some(layout);
                        layout
                    }
                    None => {
                        self.exhausted = true;
                        return None;
                    }
                },
            };

            let Some(line) = self.lines.next() else {
                self.exhausted = true;
                return None;
            };
            if is_noise(&line) {
                continue;
            }
            if line.trim().is_empty() {
                self.layout = None;
                continue;
            }
            match parse_row(self.shape, &layout, &line) {
                Some(record) => return Some(record),
                None => log::debug!("跳过无法解析的行: {:?}", line),
            }
        }
    }
}
