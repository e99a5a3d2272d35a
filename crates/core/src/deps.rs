//! package.json dependency freshness
//!
//! Pure functions for reading dependency requirements out of a package.json,
//! comparing them with the latest published versions, and persisting the
//! registry lookups in a small JSON cache file with a 24-hour lifetime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the version cache inside the cache directory
pub const CACHE_FILE: &str = "package-version-cache.json";

/// How long a registry lookup stays valid
pub const CACHE_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum DepsError {
    #[error("Invalid package.json: {0}")]
    InvalidManifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cache file: {0}")]
    InvalidCache(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
}

impl DependencyKind {
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub requirement: String,
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Freshness {
    UpToDate { latest: String },
    Outdated { latest: String },
    Unknown { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    #[serde(flatten)]
    pub dependency: Dependency,
    #[serde(flatten)]
    pub freshness: Freshness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: String,
    /// Unix seconds
    pub fetched_at: i64,
}

impl CacheEntry {
    // `fetched_at` comes from a user-editable file and may be any i64.
    fn is_fresh(&self, now: i64) -> bool {
        now.saturating_sub(self.fetched_at) < CACHE_TTL_SECS
    }
}

/// Registry lookups keyed by package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl VersionCache {
    /// Cached version for `name` if it was fetched less than 24 hours before `now`.
    pub fn fresh(&self, name: &str, now: i64) -> Option<&str> {
        self.entries
            .get(name)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.version.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>, now: i64) {
        self.entries.insert(
            name.into(),
            CacheEntry {
                version: version.into(),
                fetched_at: now,
            },
        );
    }

    /// Drop entries that are no longer fresh
    pub fn prune(&mut self, now: i64) {
        self.entries
            .retain(|_, entry| entry.is_fresh(now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read the cache from `cache_dir`, returning an empty cache if the file is missing.
pub fn load_cache(cache_dir: &Path) -> Result<VersionCache, DepsError> {
    let path = cache_dir.join(CACHE_FILE);
    if !path.exists() {
        return Ok(VersionCache::default());
    }

    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|e| DepsError::InvalidCache(e.to_string()))
}

/// Write the cache to `cache_dir`, creating the directory if needed.
pub fn save_cache(cache_dir: &Path, cache: &VersionCache) -> Result<(), DepsError> {
    fs::create_dir_all(cache_dir)?;

    let content =
        serde_json::to_string_pretty(cache).map_err(|e| DepsError::InvalidCache(e.to_string()))?;
    fs::write(cache_dir.join(CACHE_FILE), content)?;

    Ok(())
}

/// Extract `dependencies` and `devDependencies` from package.json text.
///
/// Entries are ordered by kind, then by name.
pub fn parse_manifest(json: &str) -> Result<Vec<Dependency>, DepsError> {
    let manifest: serde_json::Value =
        serde_json::from_str(json).map_err(|e| DepsError::InvalidManifest(e.to_string()))?;

    if !manifest.is_object() {
        return Err(DepsError::InvalidManifest(
            "top-level value must be an object".to_string(),
        ));
    }

    let mut dependencies = Vec::new();

    for kind in [DependencyKind::Dependencies, DependencyKind::DevDependencies] {
        let Some(section) = manifest.get(kind.manifest_key()) else {
            continue;
        };

        let section = section.as_object().ok_or_else(|| {
            DepsError::InvalidManifest(format!("'{}' must be an object", kind.manifest_key()))
        })?;

        let mut entries: Vec<Dependency> = section
            .iter()
            .map(|(name, requirement)| {
                let requirement = requirement.as_str().ok_or_else(|| {
                    DepsError::InvalidManifest(format!("version of '{name}' must be a string"))
                })?;
                Ok(Dependency {
                    name: name.clone(),
                    requirement: requirement.to_string(),
                    kind,
                })
            })
            .collect::<Result<_, DepsError>>()?;

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        dependencies.extend(entries);
    }

    Ok(dependencies)
}

/// Reduce a version requirement to the version it pins against.
///
/// `^1.2.3` and `~1.2.3` become `1.2.3`; `>=2.0.0 <3` becomes `2.0.0`.
/// Non-registry specifiers (`*`, `latest`, git, file, workspace, URLs,
/// npm aliases) yield `None`.
pub fn clean_requirement(requirement: &str) -> Option<String> {
    let trimmed = requirement.trim();

    if trimmed.is_empty()
        || trimmed == "*"
        || trimmed == "latest"
        || trimmed.contains(':')
        || trimmed.contains('/')
    {
        return None;
    }

    // Take the first alternative and the first comparator of a range.
    let first = trimmed.split("||").next()?.split_whitespace().next()?;
    let version = first.trim_start_matches(['^', '~', '>', '<', '=', 'v']);

    if version.is_empty() || !version.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let version = version.replace(['x', 'X', '*'], "0");
    Some(version)
}

/// Compare versions - returns true if current >= latest
///
/// Compares dotted versions part by part, padding the shorter one with
/// zeros. Pre-release and build suffixes are ignored.
pub fn is_version_up_to_date(current: &str, latest: &str) -> bool {
    fn parts(version: &str) -> Vec<u64> {
        version
            .trim_start_matches('v')
            .split(['-', '+'])
            .next()
            .unwrap_or_default()
            .split('.')
            .map(|p| p.parse::<u64>().unwrap_or(0))
            .collect()
    }

    let mut current_parts = parts(current);
    let mut latest_parts = parts(latest);

    let max_len = current_parts.len().max(latest_parts.len());
    current_parts.resize(max_len, 0);
    latest_parts.resize(max_len, 0);

    current_parts >= latest_parts
}

/// `Unknown` for requirements that cannot be looked up on the registry
/// (`file:`, `workspace:`, git URLs, `latest`, ...), `None` otherwise.
pub fn non_registry(dependency: &Dependency) -> Option<Freshness> {
    match clean_requirement(&dependency.requirement) {
        Some(_) => None,
        None => Some(Freshness::Unknown {
            reason: format!("'{}' is not a registry version", dependency.requirement),
        }),
    }
}

/// Classify one dependency against the latest published version.
pub fn classify(dependency: &Dependency, latest: &str) -> Freshness {
    if let Some(unknown) = non_registry(dependency) {
        return unknown;
    }

    match clean_requirement(&dependency.requirement) {
        Some(current) if is_version_up_to_date(&current, latest) => Freshness::UpToDate {
            latest: latest.to_string(),
        },
        _ => Freshness::Outdated {
            latest: latest.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "name": "site",
        "dependencies": {
            "react": "^18.2.0",
            "papaparse": "~5.4.1",
            "local-lib": "file:../lib"
        },
        "devDependencies": {
            "typescript": "5.3.3"
        }
    }"#;

    // ============================================================================
    // parse_manifest tests
    // ============================================================================

    #[test]
    fn test_parse_manifest_sorted_by_kind_then_name() {
        let deps = parse_manifest(MANIFEST).unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["local-lib", "papaparse", "react", "typescript"]);
        assert_eq!(deps[3].kind, DependencyKind::DevDependencies);
        assert_eq!(deps[2].requirement, "^18.2.0");
    }

    #[test]
    fn test_parse_manifest_without_dependencies() {
        assert!(parse_manifest(r#"{"name": "empty"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_manifest_invalid_json() {
        assert!(matches!(
            parse_manifest("{"),
            Err(DepsError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_parse_manifest_non_string_version() {
        let result = parse_manifest(r#"{"dependencies": {"react": 18}}"#);
        assert!(matches!(result, Err(DepsError::InvalidManifest(_))));
    }

    // ============================================================================
    // clean_requirement tests
    // ============================================================================

    #[test]
    fn test_clean_requirement_operators() {
        assert_eq!(clean_requirement("^1.2.3").as_deref(), Some("1.2.3"));
        assert_eq!(clean_requirement("~1.2.3").as_deref(), Some("1.2.3"));
        assert_eq!(clean_requirement(">=2.0.0 <3").as_deref(), Some("2.0.0"));
        assert_eq!(clean_requirement("v4.0.0").as_deref(), Some("4.0.0"));
        assert_eq!(clean_requirement("1.x").as_deref(), Some("1.0"));
        assert_eq!(clean_requirement("1.2.3 || 2.0.0").as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_clean_requirement_non_registry() {
        assert_eq!(clean_requirement("*"), None);
        assert_eq!(clean_requirement("latest"), None);
        assert_eq!(clean_requirement("file:../lib"), None);
        assert_eq!(clean_requirement("workspace:*"), None);
        assert_eq!(clean_requirement("github:user/repo"), None);
        assert_eq!(clean_requirement("user/repo"), None);
        assert_eq!(clean_requirement(""), None);
    }

    // ============================================================================
    // is_version_up_to_date tests
    // ============================================================================

    #[test]
    fn test_is_version_up_to_date_same_version() {
        assert!(is_version_up_to_date("1.2.3", "1.2.3"));
    }

    #[test]
    fn test_is_version_up_to_date_current_older() {
        assert!(!is_version_up_to_date("1.2.3", "1.2.4"));
        assert!(!is_version_up_to_date("1.9.9", "2.0.0"));
    }

    #[test]
    fn test_is_version_up_to_date_padding() {
        assert!(is_version_up_to_date("1.2", "1.2.0"));
        assert!(!is_version_up_to_date("1.2", "1.2.1"));
    }

    #[test]
    fn test_is_version_up_to_date_ignores_prerelease() {
        assert!(is_version_up_to_date("2.0.0-beta.1", "2.0.0"));
        assert!(is_version_up_to_date("2.0.0", "2.0.0+build.5"));
    }

    // ============================================================================
    // classify tests
    // ============================================================================

    #[test]
    fn test_classify() {
        let deps = parse_manifest(MANIFEST).unwrap();

        assert_eq!(
            classify(&deps[2], "18.2.0"),
            Freshness::UpToDate {
                latest: "18.2.0".to_string()
            }
        );
        assert_eq!(
            classify(&deps[2], "19.0.0"),
            Freshness::Outdated {
                latest: "19.0.0".to_string()
            }
        );
        assert!(matches!(
            classify(&deps[0], "1.0.0"),
            Freshness::Unknown { .. }
        ));
    }

    #[test]
    fn test_non_registry() {
        let dependency = |requirement: &str| Dependency {
            name: "local-lib".to_string(),
            requirement: requirement.to_string(),
            kind: DependencyKind::Dependencies,
        };

        assert_eq!(
            non_registry(&dependency("file:../lib")),
            Some(Freshness::Unknown {
                reason: "'file:../lib' is not a registry version".to_string()
            })
        );
        assert!(non_registry(&dependency("workspace:*")).is_some());
        assert_eq!(non_registry(&dependency("^1.2.0")), None);
    }

    // ============================================================================
    // cache tests
    // ============================================================================

    #[test]
    fn test_cache_fresh_within_ttl() {
        let mut cache = VersionCache::default();
        cache.insert("react", "18.2.0", 1_000);

        assert_eq!(cache.fresh("react", 1_000), Some("18.2.0"));
        assert_eq!(cache.fresh("react", 1_000 + CACHE_TTL_SECS - 1), Some("18.2.0"));
    }

    #[test]
    fn test_cache_stale_after_ttl() {
        let mut cache = VersionCache::default();
        cache.insert("react", "18.2.0", 1_000);

        assert_eq!(cache.fresh("react", 1_000 + CACHE_TTL_SECS), None);
        assert_eq!(cache.fresh("vue", 1_000), None);
    }

    #[test]
    fn test_cache_prune() {
        let mut cache = VersionCache::default();
        cache.insert("old", "1.0.0", 0);
        cache.insert("new", "2.0.0", CACHE_TTL_SECS);

        cache.prune(CACHE_TTL_SECS + 10);
        assert_eq!(cache.len(), 1);
        assert!(cache.fresh("new", CACHE_TTL_SECS + 10).is_some());
    }

    #[test]
    fn test_save_and_load_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("nested");

        let mut cache = VersionCache::default();
        cache.insert("react", "18.2.0", 42);
        save_cache(&cache_dir, &cache).unwrap();

        let loaded = load_cache(&cache_dir).unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn test_load_cache_extreme_timestamp_is_stale() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CACHE_FILE),
            r#"{"react":{"version":"1.0.0","fetched_at":-9223372036854775808}}"#,
        )
        .unwrap();

        let mut cache = load_cache(temp_dir.path()).unwrap();
        assert_eq!(cache.fresh("react", 1_700_000_000), None);

        cache.prune(1_700_000_000);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_cache_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_cache(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_cache_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CACHE_FILE), "not json").unwrap();

        assert!(matches!(
            load_cache(temp_dir.path()),
            Err(DepsError::InvalidCache(_))
        ));
    }
}
