use std::fs;
use std::path::PathBuf;

use winget_bridge::winget::details::parse_all;
use winget_bridge::winget::streaming::clean_line;
use winget_bridge::winget::structured;
use winget_bridge::winget::table::TableParser;
use winget_bridge::winget::{Package, SourceClassification, SourceRegistry, TableShape};

fn registry() -> SourceRegistry {
    SourceRegistry::new(vec!["winget".to_string(), "msstore".to_string()], "winget")
}

fn winget() -> SourceClassification {
    SourceClassification::Registry("winget".to_string())
}

fn legacy_packages(name: &str, shape: TableShape) -> Vec<Package> {
    let content = fixture(name);
    let registry = registry();
    TableParser::new(content.lines().map(clean_line), shape)
        .map(|record| registry.package(record, shape))
        .collect()
}

fn find<'a>(packages: &'a [Package], id: &str) -> &'a Package {
    packages
        .iter()
        .find(|package| package.id == id)
        .unwrap_or_else(|| panic!("{} should be listed", id))
}

#[test]
fn test_installed_fixture_classifies_local_sources() {
    let packages = legacy_packages("winget-list.txt", TableShape::Installed);
    assert_eq!(packages.len(), 9);

    let git = find(&packages, "Git.Git");
    assert_eq!(git.version, "2.43.0");
    assert_eq!(git.source, winget());

    let edge = find(&packages, "Microsoft.Edge");
    assert_eq!(edge.version, "122.0.2365.66");
    assert_eq!(edge.source, winget());

    assert_eq!(find(&packages, "Steam").source, SourceClassification::LocalPc);
    assert_eq!(
        find(&packages, "Microsoft.WindowsTerminal_8wekyb3d8bbwe").source,
        SourceClassification::MicrosoftStore
    );
    assert_eq!(find(&packages, "1207658924_is1").source, SourceClassification::Gog);
    assert_eq!(
        find(&packages, "com.android.chrome").source,
        SourceClassification::AndroidSubsystem
    );
    assert_eq!(find(&packages, "Uplay").source, SourceClassification::UbisoftConnect);

    let wechat = find(&packages, "Tencent.WeChat");
    assert_eq!(wechat.name, "微信");
    assert_eq!(wechat.version, "3.9.8.25");
    assert_eq!(wechat.source, SourceClassification::LocalPc);

    let seven_zip = find(&packages, "7zip.7zip");
    assert_eq!(seven_zip.name, "7-Zip 23.01 (x64)");
    assert_eq!(seven_zip.source, winget());
}

#[test]
fn test_upgrade_fixture_reads_both_sections() {
    let packages = legacy_packages("winget-upgrade.txt", TableShape::Updates);
    let ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["Git.Git", "Microsoft.Teams", "OpenJS.NodeJS.LTS", "Discord.Discord"]
    );

    let teams = find(&packages, "Microsoft.Teams");
    assert_eq!(teams.version, "< 24004.1307");
    assert_eq!(teams.new_version.as_deref(), Some("24033.813.2"));

    let discord = find(&packages, "Discord.Discord");
    assert_eq!(discord.new_version.as_deref(), Some("1.0.9030"));
}

#[test]
fn test_search_fixture_skips_match_column() {
    let packages = legacy_packages("winget-search.txt", TableShape::Search);
    assert_eq!(packages.len(), 4);

    let desktop = find(&packages, "GitHub.GitHubDesktop");
    assert_eq!(desktop.version, "3.3.10");
    assert_eq!(desktop.source, winget());

    let extensions = find(&packages, "GitExtensionsTeam.GitExt…");
    assert_eq!(extensions.name, "Git Extensions");
    assert_eq!(extensions.version, "4.2.1");

    let store = find(&packages, "9NBLGGH4NNS1");
    assert_eq!(store.name, "Git for Windows (Store)");
    assert_eq!(store.source, SourceClassification::Registry("msstore".to_string()));
}

#[test]
fn test_legacy_parse_is_repeatable() {
    let first = legacy_packages("winget-list.txt", TableShape::Installed);
    let second = legacy_packages("winget-list.txt", TableShape::Installed);
    assert_eq!(first, second);
}

#[test]
fn test_structured_fixture_classifies_local_sources() {
    let content = fixture("powershell-installed.txt");
    let registry = registry();
    let packages: Vec<Package> = content
        .lines()
        .map(clean_line)
        .filter_map(|line| structured::parse_line(TableShape::Installed, &line))
        .map(|record| registry.package(record, TableShape::Installed))
        .collect();

    assert_eq!(packages.len(), 5);
    assert_eq!(find(&packages, "Git.Git").source, winget());
    assert_eq!(find(&packages, "Steam App 730").source, SourceClassification::Steam);
    assert_eq!(
        find(&packages, "Uplay Install 635").source,
        SourceClassification::UbisoftConnect
    );
    assert_eq!(
        find(&packages, "Microsoft.WindowsTerminal_8wekyb3d8bbwe").source,
        SourceClassification::MicrosoftStore
    );
    assert_eq!(
        find(&packages, "com.android.chrome").source,
        SourceClassification::AndroidSubsystem
    );
}

#[test]
fn test_show_fixture_extracts_details() {
    let content = fixture("winget-show.txt");
    let details = parse_all(content.lines().map(clean_line));

    assert_eq!(details.publisher.as_deref(), Some("Microsoft Corporation"));
    assert_eq!(details.author.as_deref(), Some("Microsoft Corporation"));
    assert_eq!(details.license.as_deref(), Some("Microsoft Software License"));
    assert_eq!(
        details.license_url.as_ref().map(|u| u.as_str()),
        Some("https://code.visualstudio.com/License")
    );

    let description = details.description.expect("description should be parsed");
    assert_eq!(description.lines().count(), 2);
    assert!(description.ends_with("Linux, macOS, and Windows."));

    let notes = details.release_notes.expect("release notes should be parsed");
    assert!(notes.starts_with("Welcome to the February 2024 release"));
    assert_eq!(notes.lines().count(), 2);

    assert_eq!(details.tags, vec!["code", "developer-tools", "editor", "ide"]);
    assert_eq!(details.installer_type.as_deref(), Some("inno"));
    assert_eq!(details.release_date.as_deref(), Some("2024-03-13"));
    assert!(details.installer_hash.is_some_and(|hash| hash.len() == 64));
    assert!(details.installer_url.is_some());
    assert!(details.release_notes_url.is_some());
    assert!(details.homepage.is_some());
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}
