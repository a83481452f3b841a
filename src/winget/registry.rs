//! 软件源查找：把记录中的来源名映射为来源

use super::classify::classify;
use super::types::{Package, RawPackageRecord, SourceClassification, TableShape};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct SourceRegistry {
    known: Vec<String>,
    default: String,
}

impl SourceRegistry {
    pub fn new(known: Vec<String>, default: &str) -> Self {
        Self {
            known,
            default: default.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.known_sources.clone(), &config.default_source)
    }

    pub fn default_source(&self) -> SourceClassification {
        SourceClassification::Registry(self.default.clone())
    }

    /// 已知来源按名称返回，否则返回默认来源（名称忽略大小写）
    pub fn get_or_default(&self, name: &str) -> SourceClassification {
        self.known
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name.trim()))
            .map(|known| SourceClassification::Registry(known.clone()))
            .unwrap_or_else(|| {
                log::debug!("未知来源 {:?}，使用默认来源 {}", name, self.default);
                self.default_source()
            })
    }

    /// 没有正式来源的包
    pub fn local_source(&self, id: &str) -> SourceClassification {
        classify(id)
    }

    /// 缺少来源时：已安装列表按 Id 推断，其余使用默认来源
    pub fn resolve(&self, record: &RawPackageRecord, shape: TableShape) -> SourceClassification {
        match (&record.source_name, shape) {
            (Some(name), _) => self.get_or_default(name),
            (None, TableShape::Installed) => self.local_source(&record.id),
            (None, TableShape::Search | TableShape::Updates) => self.default_source(),
        }
    }

    pub fn package(&self, record: RawPackageRecord, shape: TableShape) -> Package {
        let source = self.resolve(&record, shape);
        Package {
            name: record.name,
            id: record.id,
            version: record.installed_version,
            new_version: record.available_version,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SourceRegistry {
        SourceRegistry::new(vec!["winget".to_string(), "msstore".to_string()], "winget")
    }

    fn record(id: &str, source: Option<&str>) -> RawPackageRecord {
        RawPackageRecord {
            name: id.to_string(),
            id: id.to_string(),
            installed_version: "1.0".to_string(),
            available_version: None,
            source_name: source.map(str::to_string),
        }
    }

    #[test]
    fn declared_sources_are_looked_up() {
        let registry = registry();
        assert_eq!(
            registry.resolve(&record("9NBLGGH4NNS1", Some("msstore")), TableShape::Search),
            SourceClassification::Registry("msstore".to_string())
        );
        assert_eq!(
            registry.resolve(&record("Foo.Bar", Some("private-feed")), TableShape::Search),
            SourceClassification::Registry("winget".to_string())
        );
    }

    #[test]
    fn missing_source_depends_on_shape() {
        let registry = registry();
        let steam = record("Steam App 570", None);
        assert_eq!(registry.resolve(&steam, TableShape::Installed), SourceClassification::Steam);
        assert_eq!(
            registry.resolve(&steam, TableShape::Updates),
            SourceClassification::Registry("winget".to_string())
        );
    }

    #[test]
    fn package_carries_resolved_source() {
        let package = registry().package(record("1207658924_is1", None), TableShape::Installed);
        assert_eq!(package.source, SourceClassification::Gog);
        assert_eq!(package.version, "1.0");
    }
}
