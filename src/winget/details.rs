//! `winget show` 详情解析
//!
//! 输出大致如下，多行字段的后续行带缩进：
//!
//! ```text
//! Found Visual Studio Code [Microsoft.VisualStudioCode]
//! Publisher: Microsoft Corporation
//! Description: Code editing. Redefined.
//!   Free and built on open source.
//! Tags:
//!   developer-tools
//!   editor
//! Installer:
//!   Installer Type: inno
//!   Installer Url: https://update.code.visualstudio.com/...
//! ```

use super::types::{PackageDetails, SourceClassification};
use crate::error::DetailLineError;
use url::Url;

/// 出现这些文字说明当前语言下没有可用的清单，需要换语言重试
pub const LOCALE_REJECTION_MARKERS: &[&str] = &[
    "The value provided for the `locale` argument is invalid",
    "No applicable installer found",
];

pub fn is_locale_rejection(line: &str) -> bool {
    LOCALE_REJECTION_MARKERS
        .iter()
        .any(|marker| line.contains(marker))
}

/// 正在累积的多行字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulating {
    Idle,
    Description,
    ReleaseNotes,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Publisher,
    Author,
    Homepage,
    License,
    LicenseUrl,
    InstallerHash,
    InstallerUrl,
    ReleaseDate,
    ReleaseNotesUrl,
    InstallerType,
    Description,
    ReleaseNotes,
    Tags,
}

/// 按顺序匹配，先命中者生效
const MARKERS: &[(&str, Field)] = &[
    ("Publisher:", Field::Publisher),
    ("Author:", Field::Author),
    ("Homepage:", Field::Homepage),
    ("License:", Field::License),
    ("License Url:", Field::LicenseUrl),
    ("Installer SHA256:", Field::InstallerHash),
    ("Installer Url:", Field::InstallerUrl),
    ("Release Date:", Field::ReleaseDate),
    ("Release Notes Url:", Field::ReleaseNotesUrl),
    ("Installer Type:", Field::InstallerType),
    ("Description:", Field::Description),
    ("Release Notes:", Field::ReleaseNotes),
    ("Tags:", Field::Tags),
];

/// 一次解析尝试的状态；换语言重试时丢弃并新建
#[derive(Debug)]
pub struct DetailsParser {
    details: PackageDetails,
    state: Accumulating,
}

impl Default for DetailsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailsParser {
    pub fn new() -> Self {
        Self {
            details: PackageDetails::default(),
            state: Accumulating::Idle,
        }
    }

    pub fn state(&self) -> Accumulating {
        self.state
    }

    /// 处理一行；单行出错只记录日志，不影响后续行
    pub fn feed(&mut self, raw: &str) {
        if let Err(e) = self.feed_line(raw) {
            log::warn!("解析详情行失败 {:?}: {}", raw, e);
        }
    }

    pub fn finish(self) -> PackageDetails {
        self.details
    }

    fn feed_line(&mut self, raw: &str) -> Result<(), DetailLineError> {
        let line = raw.trim_end();
        if line.is_empty() {
            return Ok(());
        }

        let content = line.trim_start();
        let indented = content.len() != line.len();
        if indented && self.state != Accumulating::Idle && !starts_with_marker(content) {
            self.append(content);
            return Ok(());
        }
        // 未缩进的行或字段标记行结束当前多行字段，再按字段标记分派
        self.state = Accumulating::Idle;
        self.dispatch(content)
    }

    fn append(&mut self, text: &str) {
        match self.state {
            Accumulating::Description => join_line(&mut self.details.description, text),
            Accumulating::ReleaseNotes => join_line(&mut self.details.release_notes, text),
            Accumulating::Tags => self.details.tags.push(text.to_string()),
            Accumulating::Idle => {}
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<(), DetailLineError> {
        let Some((marker, field, value)) = MARKERS.iter().find_map(|&(marker, field)| {
            line.strip_prefix(marker)
                .map(|value| (marker, field, value.trim()))
        }) else {
            return Ok(());
        };

        let details = &mut self.details;
        match field {
            Field::Publisher => details.publisher = text(value),
            Field::Author => details.author = text(value),
            Field::License => details.license = text(value),
            Field::InstallerHash => details.installer_hash = text(value),
            Field::ReleaseDate => details.release_date = text(value),
            Field::InstallerType => details.installer_type = text(value),
            Field::Homepage => details.homepage = Some(parse_url(marker, value)?),
            Field::LicenseUrl => details.license_url = Some(parse_url(marker, value)?),
            Field::InstallerUrl => details.installer_url = Some(parse_url(marker, value)?),
            Field::ReleaseNotesUrl => details.release_notes_url = Some(parse_url(marker, value)?),
            Field::Description => {
                details.description = Some(value.to_string());
                self.state = Accumulating::Description;
            }
            Field::ReleaseNotes => {
                details.release_notes = Some(value.to_string());
                self.state = Accumulating::ReleaseNotes;
            }
            Field::Tags => {
                details.tags.clear();
                if !value.is_empty() {
                    details.tags.push(value.to_string());
                }
                self.state = Accumulating::Tags;
            }
        }
        Ok(())
    }
}

fn starts_with_marker(line: &str) -> bool {
    MARKERS.iter().any(|(marker, _)| line.starts_with(marker))
}

fn text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn join_line(target: &mut Option<String>, text: &str) {
    match target {
        Some(existing) if !existing.is_empty() => {
            existing.push('\n');
            existing.push_str(text);
        }
        _ => *target = Some(text.to_string()),
    }
}

fn parse_url(marker: &'static str, value: &str) -> Result<Url, DetailLineError> {
    let field = marker.trim_end_matches(':');
    if value.is_empty() {
        return Err(DetailLineError::MissingValue { field });
    }
    Url::parse(value).map_err(|_| DetailLineError::InvalidUrl {
        field,
        value: value.to_string(),
    })
}

/// 解析一次尝试的输出；遇到语言不可用的提示时放弃整个结果
pub fn parse_until_rejected<I>(lines: I) -> Option<PackageDetails>
where
    I: Iterator<Item = String>,
{
    let mut parser = DetailsParser::new();
    for line in lines {
        if is_locale_rejection(&line) {
            return None;
        }
        parser.feed(&line);
    }
    Some(parser.finish())
}

/// 最后一次尝试：接受所有输出
pub fn parse_all<I>(lines: I) -> PackageDetails
where
    I: Iterator<Item = String>,
{
    let mut parser = DetailsParser::new();
    for line in lines {
        parser.feed(&line);
    }
    parser.finish()
}

/// 清单所在的网页
pub fn manifest_url(id: &str, source: &SourceClassification) -> Option<Url> {
    let SourceClassification::Registry(name) = source else {
        return None;
    };
    let url = match name.as_str() {
        "winget" => {
            let first = id.chars().next()?.to_lowercase().to_string();
            let path = id.split('.').collect::<Vec<_>>().join("/");
            format!(
                "https://github.com/microsoft/winget-pkgs/tree/master/manifests/{}/{}",
                first, path
            )
        }
        "msstore" => format!("https://apps.microsoft.com/detail/{}", id),
        _ => return None,
    };
    Url::parse(&url).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &[&str]) -> PackageDetails {
        parse_all(text.iter().map(|s| s.to_string()))
    }

    #[test]
    fn multiline_description_closes_before_next_field() {
        let mut parser = DetailsParser::new();
        parser.feed("Description: Hello");
        assert_eq!(parser.state(), Accumulating::Description);
        parser.feed("  world");
        parser.feed("Publisher: Acme");
        assert_eq!(parser.state(), Accumulating::Idle);

        let details = parser.finish();
        assert_eq!(details.description.as_deref(), Some("Hello\nworld"));
        assert_eq!(details.publisher.as_deref(), Some("Acme"));
    }

    #[test]
    fn indented_marker_closes_description() {
        let mut parser = DetailsParser::new();
        parser.feed("Description: Hello");
        parser.feed("  Publisher: Acme");
        assert_eq!(parser.state(), Accumulating::Idle);
        parser.feed("  not a continuation anymore");

        let details = parser.finish();
        assert_eq!(details.description.as_deref(), Some("Hello"));
        assert_eq!(details.publisher.as_deref(), Some("Acme"));
    }

    #[test]
    fn indented_installer_fields_after_tags() {
        let details = parse(&["Tags:", "  editor", "  Installer Type: inno", "  Release Date: 2024-03-13"]);
        assert_eq!(details.tags, vec!["editor"]);
        assert_eq!(details.installer_type.as_deref(), Some("inno"));
        assert_eq!(details.release_date.as_deref(), Some("2024-03-13"));
    }

    #[test]
    fn full_show_output() {
        let details = parse(&[
            "Found Visual Studio Code [Microsoft.VisualStudioCode]",
            "Version: 1.85.1",
            "Publisher: Microsoft Corporation",
            "Publisher Url: https://code.visualstudio.com",
            "Author: Microsoft Corporation",
            "Moniker: vscode",
            "Description:",
            "  Visual Studio Code is a lightweight but powerful source code editor.",
            "  It comes with built-in support for JavaScript.",
            "Homepage: https://code.visualstudio.com",
            "License: Microsoft Software License",
            "License Url: https://code.visualstudio.com/License",
            "Release Notes:",
            "  Welcome to the November 2023 release.",
            "Release Notes Url: https://code.visualstudio.com/updates/v1_85",
            "Tags:",
            "  developer-tools",
            "  editor",
            "Installer:",
            "  Installer Type: inno",
            "  Installer Url: https://update.code.visualstudio.com/1.85.1/win32-x64-user/stable",
            "  Installer SHA256: 1b2a3c",
            "  Release Date: 2023-12-13",
        ]);

        assert_eq!(details.publisher.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(details.author.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(
            details.description.as_deref(),
            Some("Visual Studio Code is a lightweight but powerful source code editor.\nIt comes with built-in support for JavaScript.")
        );
        assert_eq!(details.homepage.as_ref().map(Url::as_str), Some("https://code.visualstudio.com/"));
        assert_eq!(details.license.as_deref(), Some("Microsoft Software License"));
        assert!(details.license_url.is_some());
        assert_eq!(details.release_notes.as_deref(), Some("Welcome to the November 2023 release."));
        assert!(details.release_notes_url.is_some());
        assert_eq!(details.tags, vec!["developer-tools", "editor"]);
        assert_eq!(details.installer_type.as_deref(), Some("inno"));
        assert!(details.installer_url.is_some());
        assert_eq!(details.installer_hash.as_deref(), Some("1b2a3c"));
        assert_eq!(details.release_date.as_deref(), Some("2023-12-13"));
    }

    #[test]
    fn values_keep_inner_colons() {
        let details = parse(&["Description: Note: this is fine"]);
        assert_eq!(details.description.as_deref(), Some("Note: this is fine"));
    }

    #[test]
    fn bad_url_is_skipped_without_aborting() {
        let details = parse(&["Homepage: not a url", "Author: Someone"]);
        assert_eq!(details.homepage, None);
        assert_eq!(details.author.as_deref(), Some("Someone"));
    }

    #[test]
    fn bad_url_reports_field() {
        let mut parser = DetailsParser::new();
        assert_eq!(
            parser.feed_line("License Url: ::"),
            Err(DetailLineError::InvalidUrl {
                field: "License Url",
                value: "::".to_string()
            })
        );
        assert_eq!(
            parser.feed_line("Homepage:"),
            Err(DetailLineError::MissingValue { field: "Homepage" })
        );
    }

    #[test]
    fn locale_rejection_discards_attempt() {
        let lines = [
            "Publisher: Acme",
            "The value provided for the `locale` argument is invalid",
        ];
        assert_eq!(parse_until_rejected(lines.iter().map(|s| s.to_string())), None);

        let lines = ["Publisher: Acme"];
        let details = parse_until_rejected(lines.iter().map(|s| s.to_string())).unwrap();
        assert_eq!(details.publisher.as_deref(), Some("Acme"));
    }

    #[test]
    fn manifest_urls_by_source() {
        let winget = SourceClassification::Registry("winget".to_string());
        assert_eq!(
            manifest_url("Microsoft.VisualStudioCode", &winget).unwrap().as_str(),
            "https://github.com/microsoft/winget-pkgs/tree/master/manifests/m/Microsoft/VisualStudioCode"
        );
        let msstore = SourceClassification::Registry("msstore".to_string());
        assert_eq!(
            manifest_url("9NBLGGH4NNS1", &msstore).unwrap().as_str(),
            "https://apps.microsoft.com/detail/9NBLGGH4NNS1"
        );
        assert_eq!(manifest_url("Foo", &SourceClassification::LocalPc), None);
    }
}
