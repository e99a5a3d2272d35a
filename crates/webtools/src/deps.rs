use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use webtools_core::deps::{
    classify, load_cache, non_registry, parse_manifest, save_cache, Dependency, DependencyReport,
    Freshness, VersionCache,
};

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

const REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, clap::Parser)]
#[command(name = "deps")]
#[command(about = "Check package.json dependencies against the npm registry")]
pub struct App {
    #[command(flatten)]
    pub options: DepsOptions,
}

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct DepsOptions {
    /// Path to package.json
    #[arg(value_name = "MANIFEST", default_value = "package.json")]
    pub manifest: PathBuf,

    /// npm registry base URL
    #[arg(long, env = "NPM_REGISTRY_URL", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Directory for the version cache (defaults to the platform cache dir)
    #[arg(long, env = "WEBTOOLS_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Ignore cached versions and query the registry for every package
    #[arg(long)]
    pub refresh: bool,

    /// Only show outdated or unknown dependencies
    #[arg(long)]
    pub outdated: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, serde::Deserialize)]
struct RegistryLatest {
    version: String,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let options = app.options;

    let manifest = std::fs::read_to_string(&options.manifest)
        .with_context(|| f!("Failed to read {}", options.manifest.display()))?;

    let cache_dir = resolve_cache_dir(options.cache_dir.clone())?;
    if global.verbose {
        eprintln!("Registry: {}", options.registry);
        eprintln!("Cache: {}", cache_dir.display());
    }

    let reports = check_data(&manifest, &options.registry, &cache_dir, options.refresh).await?;
    let reports: Vec<DependencyReport> = reports
        .into_iter()
        .filter(|r| !options.outdated || !matches!(r.freshness, Freshness::UpToDate { .. }))
        .collect();

    if options.json {
        output_json(&reports)
    } else {
        output_formatted(&reports);
        Ok(())
    }
}

/// Resolve the cache directory: explicit value, else `<platform cache>/webtools`
pub fn resolve_cache_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => Ok(dirs_next::cache_dir()
            .ok_or_else(|| eyre!("Unable to determine cache directory"))?
            .join("webtools")),
    }
}

/// Public function for MCP reuse
///
/// Reads cached versions, fetches the missing or stale ones concurrently, and
/// writes the cache back. Registry failures become `Unknown` entries.
pub async fn check_data(
    manifest: &str,
    registry: &str,
    cache_dir: &Path,
    refresh: bool,
) -> Result<Vec<DependencyReport>> {
    let dependencies =
        parse_manifest(manifest).map_err(|e| Error::InvalidInput(e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    let mut cache = match load_cache(cache_dir) {
        Ok(cache) => cache,
        Err(e) => {
            log::warn!("ignoring unreadable version cache: {e}");
            VersionCache::default()
        }
    };

    // A package may appear in both dependency kinds; fetch it once.
    let to_fetch: Vec<&str> = dependencies
        .iter()
        .filter(|d| non_registry(d).is_none())
        .filter(|d| refresh || cache.fresh(&d.name, now).is_none())
        .map(|d| d.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    log::debug!(
        "{} dependencies, {} to fetch from {}",
        dependencies.len(),
        to_fetch.len(),
        registry
    );

    let client = registry_client(REGISTRY_TIMEOUT)?;
    let fetched = join_all(
        to_fetch
            .iter()
            .map(|name| fetch_latest(&client, registry, name)),
    )
    .await;

    let mut failures = HashMap::new();
    for (name, result) in to_fetch.iter().zip(fetched) {
        match result {
            Ok(version) => cache.insert(*name, version, now),
            Err(e) => {
                log::warn!("registry lookup for {name} failed: {e}");
                failures.insert(name.to_string(), e.to_string());
            }
        }
    }

    cache.prune(now);
    if let Err(e) = save_cache(cache_dir, &cache) {
        log::warn!("failed to save version cache: {e}");
    }

    Ok(dependencies
        .into_iter()
        .map(|dependency| build_report(dependency, &cache, &failures, now))
        .collect())
}

fn build_report(
    dependency: Dependency,
    cache: &VersionCache,
    failures: &HashMap<String, String>,
    now: i64,
) -> DependencyReport {
    if let Some(freshness) = non_registry(&dependency) {
        return DependencyReport {
            dependency,
            freshness,
        };
    }

    let freshness = match cache.fresh(&dependency.name, now) {
        Some(latest) => classify(&dependency, latest),
        None => Freshness::Unknown {
            reason: failures
                .get(&dependency.name)
                .cloned()
                .unwrap_or_else(|| "no registry data".to_string()),
        },
    };

    DependencyReport {
        dependency,
        freshness,
    }
}

/// HTTP client whose requests give up after `timeout`
fn registry_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {e}"))
}

async fn fetch_latest(client: &reqwest::Client, registry: &str, name: &str) -> Result<String> {
    // Scoped names keep their '@' but the '/' must be escaped.
    let url = f!(
        "{}/{}/latest",
        registry.trim_end_matches('/'),
        urlencoding::encode(name).replace("%40", "@")
    );

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| Error::Network(f!("Failed to fetch {name}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Network(f!(
            "Failed to fetch {name}: HTTP {}",
            response.status()
        ))
        .into());
    }

    let latest: RegistryLatest = response
        .json()
        .await
        .map_err(|e| Error::Network(f!("Failed to parse registry response for {name}: {e}")))?;

    Ok(latest.version)
}

fn output_formatted(reports: &[DependencyReport]) {
    if reports.is_empty() {
        println!("{}", "No dependencies to report.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![b => "PACKAGE", "KIND", "WANTED", "LATEST", "STATUS"]);

    for report in reports {
        let dependency = &report.dependency;
        let (latest, status) = match &report.freshness {
            Freshness::UpToDate { latest } => (latest.clone(), "up to date".green().to_string()),
            Freshness::Outdated { latest } => (latest.clone(), "outdated".red().to_string()),
            Freshness::Unknown { reason } => ("-".to_string(), reason.yellow().to_string()),
        };

        table.add_row(prettytable::row![
            dependency.name,
            dependency.kind.manifest_key(),
            dependency.requirement,
            latest,
            status
        ]);
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use webtools_core::deps::DependencyKind;

    #[test]
    fn test_build_report_uses_cache() {
        let mut cache = VersionCache::default();
        cache.insert("react", "19.0.0", 100);

        let report = build_report(
            Dependency {
                name: "react".to_string(),
                requirement: "^18.2.0".to_string(),
                kind: DependencyKind::Dependencies,
            },
            &cache,
            &Default::default(),
            100,
        );

        assert_eq!(
            report.freshness,
            Freshness::Outdated {
                latest: "19.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_build_report_carries_failure_reason() {
        let mut failures = HashMap::new();
        failures.insert("left-pad".to_string(), "HTTP 404".to_string());

        let report = build_report(
            Dependency {
                name: "left-pad".to_string(),
                requirement: "1.3.0".to_string(),
                kind: DependencyKind::DevDependencies,
            },
            &VersionCache::default(),
            &failures,
            100,
        );

        assert_eq!(
            report.freshness,
            Freshness::Unknown {
                reason: "HTTP 404".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_check_data_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let now = chrono::Utc::now().timestamp();

        let mut cache = VersionCache::default();
        cache.insert("react", "18.2.0", now);
        save_cache(temp_dir.path(), &cache).unwrap();

        // Unroutable registry: any request would fail, so a pass proves the cache was used.
        let reports = check_data(
            r#"{"dependencies": {"react": "^18.2.0"}}"#,
            "http://127.0.0.1:9",
            temp_dir.path(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].freshness,
            Freshness::UpToDate {
                latest: "18.2.0".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_check_data_skips_non_registry_requirements() {
        let temp_dir = TempDir::new().unwrap();

        let reports = check_data(
            r#"{"dependencies": {"local-lib": "file:../lib", "ws": "workspace:*"}}"#,
            "http://127.0.0.1:9",
            temp_dir.path(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(
                report.freshness,
                Freshness::Unknown {
                    reason: format!("'{}' is not a registry version", report.dependency.requirement)
                }
            );
        }
    }

    #[test]
    fn test_build_report_non_registry_ignores_cache() {
        let mut cache = VersionCache::default();
        cache.insert("ws", "9.9.9", 100);

        let report = build_report(
            Dependency {
                name: "ws".to_string(),
                requirement: "workspace:*".to_string(),
                kind: DependencyKind::Dependencies,
            },
            &cache,
            &Default::default(),
            100,
        );

        assert!(matches!(report.freshness, Freshness::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_fetch_latest_times_out_on_silent_registry() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let registry = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = registry_client(Duration::from_millis(200)).unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_latest(&client, &registry, "react"),
        )
        .await
        .expect("request should give up before the outer deadline");

        assert!(result.is_err());
        server.abort();
    }

    #[test]
    fn test_resolve_cache_dir_explicit() {
        let dir = resolve_cache_dir(Some(PathBuf::from("/tmp/x"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/x"));
    }
}
