//! 无来源包的来源推断
//!
//! `winget list` 会列出未通过任何软件源安装的程序，只能根据 Id 的形状猜测
//! 它来自哪里。规则按顺序匹配，先命中者生效。

use super::types::SourceClassification;

const ELLIPSIS: char = '…';

pub fn classify(id: &str) -> SourceClassification {
    if is_android_package(id) {
        SourceClassification::AndroidSubsystem
    } else if is_steam_app(id) {
        SourceClassification::Steam
    } else if is_uplay_install(id) {
        SourceClassification::UbisoftConnect
    } else if is_gog_install(id) {
        SourceClassification::Gog
    } else if is_store_package(id) {
        SourceClassification::MicrosoftStore
    } else {
        SourceClassification::LocalPc
    }
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// `id` 中第一次出现 `marker` 之后、下一次出现之前的部分
fn after_marker<'a>(id: &'a str, marker: &str) -> Option<&'a str> {
    id.split(marker).nth(1)
}

/// 形如 `com.android.chrome`：只含小写字母、点和省略号，且至少两个点
fn is_android_package(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_lowercase() || c == '.' || c == ELLIPSIS)
        && id.matches('.').count() >= 2
}

/// `Steam App 1234`；单独的 `Steam` 后面没有编号，不算
fn is_steam_app(id: &str) -> bool {
    (id == "Steam" || id.contains("Steam App "))
        && after_marker(id, "Steam App").is_some_and(|rest| all_digits(rest.trim()))
}

fn is_uplay_install(id: &str) -> bool {
    id == "Uplay"
        || (id.contains("Uplay Install ")
            && after_marker(id, "Uplay Install").is_some_and(|rest| all_digits(rest.trim())))
}

/// `1207658924_is1`
fn is_gog_install(id: &str) -> bool {
    id.ends_with("_is1") && id.split("_is1").next().is_some_and(all_digits)
}

/// `Publisher.App_8wekyb3d8bbwe`：唯一的下划线后面是 13 位发布者哈希（旧格式 14 位），
/// 列宽不足时被截断并以省略号结尾
fn is_store_package(id: &str) -> bool {
    if id.matches('_').count() != 1 {
        return false;
    }
    let Some(suffix) = id.rsplit('_').next() else {
        return false;
    };
    let len = suffix.chars().count();
    len == 14 || len == 13 || (len <= 13 && id.ends_with(ELLIPSIS))
}
