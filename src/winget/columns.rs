//! 表头定位与列偏移
//!
//! winget 的表格输出没有分隔符，字段靠列位置区分。表头下方是一行 `---`，
//! 列的起始位置取自表头文字在该行中的字符下标。

use super::types::TableShape;

/// 出现这些文字的行与表格无关（例如被固定版本的提示），直接跳过
pub const NOISE_MARKERS: &[&str] = &["have pins"];

/// 偏移校正最多回退到 `nominal - MAX_SHIFT_MARGIN`。
///
/// 该值沿用 winget 输出的经验值，没有更一般的依据。
pub const MAX_SHIFT_MARGIN: usize = 5;

pub fn is_noise(line: &str) -> bool {
    NOISE_MARKERS.iter().any(|marker| line.contains(marker))
}

pub fn is_separator(line: &str) -> bool {
    line.contains("---")
}

/// 表头用词：普通调用与搜索上下文使用不同的列名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDialect {
    /// `Name  Id  Version  Available  Source`
    Plain,
    /// `SearchName  SearchId  SearchVersion  AvailableHeader  SearchSource`
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Version,
    Available,
    Source,
}

impl HeaderDialect {
    pub fn detect(header: &str) -> Self {
        if header.contains("SearchId") {
            HeaderDialect::Search
        } else {
            HeaderDialect::Plain
        }
    }

    /// 该用词下某列的表头文字
    pub fn label(self, column: Column) -> String {
        let (prefix, suffix) = match self {
            HeaderDialect::Plain => ("", ""),
            HeaderDialect::Search => ("Search", "Header"),
        };
        match column {
            Column::Id => format!("{}Id", prefix),
            Column::Version => format!("{}Version", prefix),
            Column::Source => format!("{}Source", prefix),
            Column::Available => format!("Available{}", suffix),
        }
    }
}

/// 一个表头块内各列的起始字符偏移；None 表示该输出没有这一列。
///
/// Name 列从 0 开始，到 Id 列为止。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnLayout {
    pub id: Option<usize>,
    pub version: Option<usize>,
    pub available: Option<usize>,
    pub source: Option<usize>,
}

impl ColumnLayout {
    pub fn from_header(header: &str, shape: TableShape) -> Self {
        let dialect = HeaderDialect::detect(header);
        let find = |column| char_index_of(header, &dialect.label(column));
        Self {
            id: find(Column::Id),
            version: find(Column::Version),
            available: match shape {
                TableShape::Search => None,
                TableShape::Installed | TableShape::Updates => find(Column::Available),
            },
            source: find(Column::Source),
        }
    }

    /// 存在的列必须满足 id < version < available < source
    pub fn is_ordered(&self) -> bool {
        let present: Vec<usize> = [self.id, self.version, self.available, self.source]
            .into_iter()
            .flatten()
            .collect();
        present.windows(2).all(|pair| pair[0] < pair[1])
    }
}

/// 子串首次出现处的字符下标（不是字节下标）
fn char_index_of(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_pos| haystack[..byte_pos].chars().count())
}

/// 扫描到分隔行为止，用其前面最近的非空行作为表头。
///
/// 迭代器停在分隔行之后，剩余的行即为数据行。找不到表头时返回 None。
pub fn locate_header<I>(lines: &mut I, shape: TableShape) -> Option<ColumnLayout>
where
    I: Iterator<Item = String>,
{
    let mut header: Option<String> = None;
    for line in lines.by_ref() {
        if is_noise(&line) {
            continue;
        }
        if is_separator(&line) {
            if let Some(header) = header.take() {
                let layout = ColumnLayout::from_header(&header, shape);
                log::debug!("表头: {:?} -> {:?}", header.trim_end(), layout);
                return Some(layout);
            }
        } else if !line.trim().is_empty() {
            header = Some(line);
        }
    }
    None
}

/// 把表头中的名义偏移校正为数据行中该列真正的起始位置。
///
/// 表头按显示宽度对齐，而一个双宽字符只占一个字符下标，所以它之后的列
/// 会整体左移。从名义位置向前回退，直到前一个字符是空格；回退超过
/// `nominal - MAX_SHIFT_MARGIN` 时认为该行无法解析。
pub fn correct_offset(row: &str, nominal: usize) -> Option<usize> {
    let chars: Vec<char> = row.chars().collect();
    corrected(&chars, nominal)
}

pub(crate) fn corrected(chars: &[char], nominal: usize) -> Option<usize> {
    if nominal == 0 || nominal > chars.len() {
        return None;
    }
    let max_shift = nominal.saturating_sub(MAX_SHIFT_MARGIN);
    let mut shift = 0;
    while *chars.get(nominal - shift - 1)? != ' ' {
        shift += 1;
        if shift > max_shift {
            return None;
        }
    }
    Some(nominal - shift)
}
